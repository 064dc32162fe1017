//! Relay handlers for `/search` and `/generate`.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Response,
};
use serde_json::value::RawValue;

use crate::http::request::{display_request_id, request_id_header};
use crate::http::response::{relay_response, RelayError};
use crate::http::server::AppState;
use crate::upstream::SearchForward;

/// Validate an inbound body and hand it back untouched.
///
/// A blank body counts as `{}`. Anything else must be a JSON object or
/// array; top-level scalars are rejected.
pub fn parse_body(body: Bytes) -> Result<Bytes, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Bytes::from_static(b"{}"));
    }

    let raw: &RawValue = serde_json::from_slice(&body).map_err(RelayError::InvalidBody)?;
    let first = raw.get().trim_start().bytes().next();
    match first {
        Some(b'{') | Some(b'[') => Ok(body),
        _ => Err(RelayError::UnsupportedBody),
    }
}

/// `POST /search`: forward `{ query }` to the upstream search endpoint.
pub async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let request_id = request_id_header(&headers);
    let inbound = parse_body(body)?;
    let forward = SearchForward::from_inbound(&inbound);

    tracing::debug!(
        request_id = %display_request_id(request_id.as_ref()),
        has_query = forward.query.is_some(),
        "Search request"
    );

    let upstream = state.upstream.search(&forward, request_id.as_ref()).await?;
    Ok(relay_response(upstream))
}

/// `POST /generate`: forward the body unchanged.
pub async fn generate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RelayError> {
    let request_id = request_id_header(&headers);
    let inbound = parse_body(body)?;

    let upstream = state.upstream.generate(inbound, request_id.as_ref()).await?;
    Ok(relay_response(upstream))
}
