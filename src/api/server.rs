//! HTTP server startup and graceful shutdown.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::errors::{GatehouseError, Result};

use super::routes::build_router;
use super::state::AppState;

/// Bind and serve the API until the process receives a shutdown signal.
pub async fn start_api_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| GatehouseError::config(format!("Invalid API address: {}", e)))?;

    let router = build_router(state, config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatehouseError::config(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GatehouseError::internal(format!("API server error: {}", e)))?;

    info!("API server shutdown completed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
