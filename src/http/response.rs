//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Relay the upstream status and JSON body to the caller
//! - Map relay failures to HTTP status codes with a JSON error body
//!
//! # Design Decisions
//! - Unreachable upstream / unreadable body / non-JSON body → 502 Bad Gateway
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Malformed inbound JSON, or a top-level scalar → 400 Bad Request
//! - Upstream bodies are relayed byte for byte, never re-encoded

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::upstream::{UpstreamError, UpstreamResponse};

/// Errors surfaced to callers of the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound body is not JSON.
    #[error("Request body is not valid JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),

    /// Inbound body is JSON but neither an object nor an array.
    #[error("Request body must be a JSON object or array")]
    UnsupportedBody,

    /// The upstream call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RelayError {
    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidBody(_) | RelayError::UnsupportedBody => StatusCode::BAD_REQUEST,
            RelayError::Upstream(e) => match e {
                UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                UpstreamError::Unreachable(_)
                | UpstreamError::Body(_)
                | UpstreamError::InvalidJson(_) => StatusCode::BAD_GATEWAY,
                UpstreamError::InvalidUrl(_) | UpstreamError::Request(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Relay failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Rejected request");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Turn an upstream answer into the caller's response.
pub fn relay_response(upstream: UpstreamResponse) -> Response {
    (
        upstream.status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        Body::from(upstream.body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[test]
    fn test_status_mapping() {
        let invalid = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(RelayError::InvalidBody(invalid).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::UnsupportedBody.status(), StatusCode::BAD_REQUEST);

        let cases = [
            (UpstreamError::Timeout(30), StatusCode::GATEWAY_TIMEOUT),
            (UpstreamError::Unreachable("refused".into()), StatusCode::BAD_GATEWAY),
            (UpstreamError::Body("length limit exceeded".into()), StatusCode::BAD_GATEWAY),
            (UpstreamError::Request("bad header".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(RelayError::from(err).status(), expected);
        }

        let not_json = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert_eq!(
            RelayError::from(UpstreamError::InvalidJson(not_json)).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_relay_response_keeps_status_and_bytes() {
        let response = relay_response(UpstreamResponse {
            status: StatusCode::CREATED,
            body: Bytes::from_static(br#"{"zeta":1,"alpha":2,"n":1e2}"#),
        });
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"zeta":1,"alpha":2,"n":1e2}"#);
    }

    #[test]
    fn test_error_response_shape() {
        let response = RelayError::from(UpstreamError::Timeout(5)).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
