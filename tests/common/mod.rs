//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use search_relay::config::RelayConfig;
use search_relay::http::HttpServer;
use search_relay::lifecycle::Shutdown;

/// One call observed by the echo upstream.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub body: Value,
    /// Body bytes exactly as they arrived.
    pub raw_body: Bytes,
    pub request_id: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

/// Calls received by an echo upstream, in arrival order.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// Serve `router` on an ephemeral port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

async fn echo(
    State(recorder): State<Recorder>,
    uri: Uri,
    headers: HeaderMap,
    raw_body: Bytes,
) -> Json<Value> {
    let body: Value = serde_json::from_slice(&raw_body).unwrap();
    recorder.calls.lock().unwrap().push(RecordedCall {
        path: uri.path().to_string(),
        body: body.clone(),
        raw_body,
        request_id: headers.get("x-request-id").map(|v| v.as_bytes().to_vec()),
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    Json(json!({ "path": uri.path(), "received": body }))
}

fn echo_routes(recorder: Recorder) -> Router {
    Router::new()
        .route("/api/search/", post(echo))
        .route("/api/generate/", post(echo))
        .with_state(recorder)
}

/// Start an upstream that answers `{ "path": ..., "received": <body> }`.
pub async fn start_echo_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let addr = serve(echo_routes(recorder.clone())).await;
    (addr, recorder)
}

/// Same as [`start_echo_upstream`], mounted below `prefix`.
pub async fn start_prefixed_echo_upstream(prefix: &str) -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let addr = serve(Router::new().nest(prefix, echo_routes(recorder.clone()))).await;
    (addr, recorder)
}

/// Start a programmable upstream: every request gets `f()`'s status,
/// content type and body.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, &'static str, String)> + Send + 'static,
{
    let router = Router::new().fallback(move || {
        let f = f.clone();
        async move {
            let (status, content_type, body) = f().await;
            let status = StatusCode::from_u16(status).unwrap();
            (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
    });
    serve(router).await
}

/// An address nothing listens on.
pub fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Relay config pointing at `upstream`, listening on an ephemeral port.
pub fn relay_config(upstream: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.base_url = upstream.to_string();
    config
}

/// Start the relay; the returned `Shutdown` stops it.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// A client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
