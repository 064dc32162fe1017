//! HTTP client for the upstream service.

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::de::IgnoredAny;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::request::{display_request_id, X_REQUEST_ID};
use crate::resilience::with_timeout;
use crate::upstream::types::{Endpoint, SearchForward, UpstreamError, UpstreamResponse};

/// Client bound to one upstream origin.
///
/// Cheap to share behind an `Arc`; the underlying hyper client pools
/// connections internally.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: Url,
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    max_body_size: usize,
}

impl UpstreamClient {
    /// Build a client from validated configuration.
    pub fn new(config: &UpstreamConfig, max_body_size: usize) -> Result<Self, UpstreamError> {
        let mut base_url = Url::parse(&config.base_url)?;

        // `Url::join` replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            base_url,
            client,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_body_size,
        })
    }

    /// Base URL the endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of an upstream endpoint.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, UpstreamError> {
        Ok(self.base_url.join(endpoint.path())?)
    }

    /// Forward a search: only `query` is sent.
    pub async fn search(
        &self,
        forward: &SearchForward,
        request_id: Option<&HeaderValue>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let payload = serde_json::to_vec(forward).map_err(|e| UpstreamError::Request(e.to_string()))?;
        self.post_json(Endpoint::Search, Bytes::from(payload), request_id).await
    }

    /// Forward a generate request with the inbound body unchanged.
    pub async fn generate(
        &self,
        body: Bytes,
        request_id: Option<&HeaderValue>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        self.post_json(Endpoint::Generate, body, request_id).await
    }

    /// POST an already-encoded JSON body to `endpoint`.
    ///
    /// Exactly one request is issued. The whole exchange, body included, is
    /// bounded by the configured request timeout. The answer must be JSON
    /// and is returned byte for byte.
    pub async fn post_json(
        &self,
        endpoint: Endpoint,
        payload: Bytes,
        request_id: Option<&HeaderValue>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.endpoint_url(endpoint)?;
        let uri: Uri = url
            .as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| UpstreamError::Request(e.to_string()))?;

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(value) = request_id {
            builder = builder.header(X_REQUEST_ID, value.clone());
        }
        let request = builder
            .body(Body::from(payload))
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let request_id = display_request_id(request_id);
        tracing::debug!(
            request_id = %request_id,
            endpoint = endpoint.name(),
            url = %url,
            "Forwarding to upstream"
        );

        let start_time = Instant::now();
        let (status, bytes) = with_timeout(self.request_timeout, async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| UpstreamError::Unreachable(describe(&e)))?;

            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(Body::new(body), self.max_body_size)
                .await
                .map_err(|e| UpstreamError::Body(e.to_string()))?;
            Ok::<_, UpstreamError>((parts.status, bytes))
        })
        .await?;

        serde_json::from_slice::<IgnoredAny>(&bytes).map_err(UpstreamError::InvalidJson)?;

        tracing::info!(
            request_id = %request_id,
            endpoint = endpoint.name(),
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "Upstream responded"
        );

        Ok(UpstreamResponse { status, body: bytes })
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> UpstreamClient {
        let config = UpstreamConfig {
            base_url: base_url.to_string(),
            ..UpstreamConfig::default()
        };
        UpstreamClient::new(&config, 1024).unwrap()
    }

    #[tokio::test]
    async fn test_endpoint_urls_from_bare_origin() {
        let client = client_for("http://localhost:8000");
        assert_eq!(
            client.endpoint_url(Endpoint::Search).unwrap().as_str(),
            "http://localhost:8000/api/search/"
        );
        assert_eq!(
            client.endpoint_url(Endpoint::Generate).unwrap().as_str(),
            "http://localhost:8000/api/generate/"
        );
    }

    #[tokio::test]
    async fn test_endpoint_urls_keep_path_prefix() {
        let client = client_for("http://backend:9000/market");
        assert_eq!(
            client.endpoint_url(Endpoint::Search).unwrap().as_str(),
            "http://backend:9000/market/api/search/"
        );

        let client = client_for("http://backend:9000/market/");
        assert_eq!(
            client.endpoint_url(Endpoint::Generate).unwrap().as_str(),
            "http://backend:9000/market/api/generate/"
        );
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let config = UpstreamConfig {
            base_url: "::not a url::".to_string(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            UpstreamClient::new(&config, 1024),
            Err(UpstreamError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        // Bind then drop to get a port nobody is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let result = client.generate(Bytes::from_static(b"{}"), None).await;
        assert!(matches!(result, Err(UpstreamError::Unreachable(_))));
    }
}
