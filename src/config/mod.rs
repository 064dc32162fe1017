//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI / environment overrides
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared by the server and the upstream client
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at process start; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError, ConfigOverrides};
pub use schema::RelayConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamConfig;
pub use schema::LimitsConfig;
pub use schema::{LogFormat, ObservabilityConfig};
