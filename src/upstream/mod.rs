//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! handler (search / generate)
//!     → types.rs (SearchForward extracts `query`; generate body untouched)
//!     → client.rs (POST {base_url}/api/<route>/, deadline, body cap)
//!     → UpstreamResponse { status, JSON body }
//! ```
//!
//! # Design Decisions
//! - Base URL comes from configuration, resolved once at startup
//! - One outbound call per inbound request, no retries
//! - Responses are parsed as JSON; anything else is an upstream error

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{Endpoint, SearchForward, UpstreamError, UpstreamResponse};
