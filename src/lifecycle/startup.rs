//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener from validated configuration
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after config and logging are ready

use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Bind the TCP listener and log the effective address.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, std::io::Error> {
    let listener = TcpListener::bind(&config.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    Ok(listener)
}
