//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce request deadline)
//!     → On failure: error mapped to 502/504, never retried
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - No retries: both routes are POST and not idempotent

pub mod timeouts;

pub use timeouts::with_timeout;
