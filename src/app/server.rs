//! HTTP server: router assembly, binding, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GatewayConfig;
use crate::health::health_handler;
use crate::handlers::gateway_handler;
use crate::registry::Reconciler;

use super::state::AppState;

/// Build the application router: `/healthz` plus a catch-all that forwards
/// everything else into the transcoding handler.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .fallback(gateway_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until a shutdown signal arrives, then close the
/// reconciler's background tasks before returning.
pub async fn start_server(
    config: &GatewayConfig,
    state: AppState,
    reconciler: Arc<Reconciler>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let bind_addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("failed to bind to {}: {}", bind_addr, e))?;

    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    info!("server stopped accepting connections, closing reconciler");
    reconciler.close();

    Ok(())
}

async fn wait_for_shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received shutdown signal");
    }
}
