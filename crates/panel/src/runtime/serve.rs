//! Serve — build the HTTP router and serve until shutdown.

use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::archive::route::{debug_handler, dependencies_handler};
use crate::console::route::{lines_handler, send_handler, status_handler};
use crate::health::route::health_handler;
use crate::runtime::stop::shutdown_signal;
use crate::state::SharedState;

/// Module archives are uploaded whole.
const MAX_ARCHIVE_BYTES: usize = 64 * 1024 * 1024;

pub fn build_router(state: SharedState) -> Router {
    let archive_router = Router::new()
        .route("/api/archive/dependencies", post(dependencies_handler))
        .route("/api/archive/debug", post(debug_handler))
        .layer(DefaultBodyLimit::max(MAX_ARCHIVE_BYTES));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/console/lines", get(lines_handler))
        .route("/api/console/send", post(send_handler))
        .route("/api/console/status", get(status_handler))
        .merge(archive_router)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn serve(state: SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = state.config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address {}: {}", state.config.bind_address, e);
        e
    })?;

    let listener = TcpListener::bind(addr).await?;
    info!("Panel listening on http://{}", addr);
    info!("  - Console lines: http://{}/api/console/lines?since=N", addr);
    info!("  - Health check: http://{}/health", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}
