//! Search relay library.
//!
//! Forwards `POST /search` and `POST /generate` to a configured upstream
//! and relays the upstream's JSON answer.

pub mod config;
pub mod http;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
