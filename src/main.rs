//! Search relay.
//!
//! A thin HTTP front-end built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────┐
//!                         │                  RELAY                    │
//!     POST /search        │  ┌────────┐    ┌─────────┐    ┌─────────┐ │   POST /api/search/
//!     POST /generate  ────┼─▶│  http  │───▶│  relay  │───▶│upstream │─┼──▶ POST /api/generate/
//!                         │  │ server │    │handlers │    │ client  │ │
//!     JSON + status   ◀───┼──│        │◀───│         │◀───│+timeout │◀┼─── JSON
//!                         │  └────────┘    └─────────┘    └─────────┘ │
//!                         │   config · logging · lifecycle            │
//!                         └───────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use search_relay::config::{resolve_config, ConfigOverrides};
use search_relay::lifecycle::{bind_listener, Shutdown};
use search_relay::observability::init_logging;
use search_relay::HttpServer;

#[derive(Parser)]
#[command(name = "search-relay")]
#[command(about = "Relays /search and /generate to the upstream service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file).
    #[arg(short, long, env = "RELAY_BIND_ADDRESS")]
    bind: Option<String>,

    /// Upstream base URL (overrides the config file).
    #[arg(short, long, env = "RELAY_UPSTREAM_BASE_URL")]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        bind_address: args.bind,
        upstream_base_url: args.upstream,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;

    init_logging(&config.observability)?;

    tracing::info!("search-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.upstream.request_timeout_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    let listener = bind_listener(&config.listener).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signal_shutdown.trigger_on_signal().await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
