//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the caller sent none
//! - Expose the ID to handlers so it can be forwarded upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A caller-supplied `x-request-id` is kept as is, byte for byte; only
//!   log output goes through a lossy UTF-8 conversion

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the correlation ID, inbound and outbound.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header exactly as received (or as set by the middleware).
pub fn request_id_header(headers: &HeaderMap) -> Option<HeaderValue> {
    headers.get(X_REQUEST_ID).cloned()
}

/// Printable form of a request ID, for logs and spans.
pub fn display_request_id(value: Option<&HeaderValue>) -> String {
    match value {
        Some(v) => String::from_utf8_lossy(v.as_bytes()).into_owned(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_uuids() {
        let request = Request::builder().body(()).unwrap();
        let mut maker = UuidRequestId;

        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();

        let a = a.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(a).is_ok());
        assert_ne!(a, b.header_value().to_str().unwrap());
    }

    #[test]
    fn test_request_id_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id_header(&headers), None);
        assert_eq!(display_request_id(None), "unknown");

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        let id = request_id_header(&headers);
        assert_eq!(display_request_id(id.as_ref()), "abc-123");
    }

    #[test]
    fn test_non_utf8_request_id_kept_raw() {
        let raw = HeaderValue::from_bytes(b"batch-\xe9-7").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, raw);

        let id = request_id_header(&headers).unwrap();
        assert_eq!(id.as_bytes(), b"batch-\xe9-7");
        assert_eq!(display_request_id(Some(&id)), "batch-\u{FFFD}-7");
    }
}
