//! Upstream payload types and error definitions.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::value::RawValue;
use thiserror::Error;

/// Upstream routes the relay knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    Generate,
}

impl Endpoint {
    /// Path relative to the upstream base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Search => "api/search/",
            Endpoint::Generate => "api/generate/",
        }
    }

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Search => "search",
            Endpoint::Generate => "generate",
        }
    }
}

/// Body forwarded on the search route.
///
/// Only `query` survives, copied byte for byte; an absent `query` forwards `{}`.
#[derive(Debug, Serialize)]
pub struct SearchForward {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Box<RawValue>>,
}

impl SearchForward {
    /// Extract the forwarded body from a validated inbound search body.
    ///
    /// Arrays carry no `query` and forward `{}`.
    pub fn from_inbound(inbound: &[u8]) -> Self {
        let query = serde_json::from_slice::<HashMap<String, Box<RawValue>>>(inbound)
            .ok()
            .and_then(|mut fields| fields.remove("query"));
        Self { query }
    }
}

/// An upstream answer whose body has been checked to be JSON.
///
/// The bytes are kept exactly as the upstream sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Errors that can occur while talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The configured base URL could not be parsed or joined.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The outbound request could not be constructed.
    #[error("Failed to build upstream request: {0}")]
    Request(String),

    /// Connection refused, reset, DNS failure, connect timeout.
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// No complete response within the request timeout.
    #[error("Upstream timeout after {0} seconds")]
    Timeout(u64),

    /// The response body could not be read (including the size cap).
    #[error("Failed to read upstream body: {0}")]
    Body(String),

    /// The response body is not JSON.
    #[error("Upstream returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}
