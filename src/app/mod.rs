//! Application builder and initialization.
//!
//! Coordinates configuration, logging, the registry reconciler, and the
//! HTTP server into a running gateway.

use std::sync::Arc;

use tracing::info;

use crate::config::GatewayConfig;
use crate::health::HealthChecker;
use crate::registry::{Reconciler, ReconcilerSettings, RegistryClient};
use crate::router::{PatternMux, RouteTable};
use crate::rpc::RpcClientFactory;

mod server;
mod state;
mod telemetry;

pub use server::create_router;
pub use state::AppState;
pub use telemetry::init_telemetry;

/// Run the gateway with the default in-memory registry and RPC factory.
///
/// Both are reference implementations: a production deployment injects its
/// own via [`run_with`] instead, since the registry backend and RPC client
/// are external collaborators this core doesn't implement.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = Arc::new(crate::registry::mock::MockRegistry::new());
    let rpc_factory = Arc::new(crate::rpc::mock::RoundRobinFactory::new());
    run_with(registry, rpc_factory).await
}

/// Run the gateway against the given registry and RPC collaborators.
pub async fn run_with(
    registry: Arc<dyn RegistryClient>,
    rpc_factory: Arc<dyn RpcClientFactory>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = load_config()?;

    info!("starting gateway");

    let mux = Arc::new(PatternMux::new());
    let routes = Arc::new(RouteTable::new(mux));

    rpc_factory
        .register_resolver(routes.clone())
        .await
        .map_err(|e| format!("failed to register RPC resolver: {}", e))?;

    let settings = ReconcilerSettings {
        refresh_interval: std::time::Duration::from_secs(config.reconciler.refresh_interval_seconds),
        watch_backoff_unit: std::time::Duration::from_secs(config.reconciler.watch_backoff_seconds),
    };
    let reconciler = Arc::new(Reconciler::new(
        config.namespace.clone(),
        registry,
        routes.clone(),
        settings,
    ));
    let (_refresh_handle, _watch_handle) = reconciler.start();

    let health_checker = Arc::new(HealthChecker::new(routes.clone(), reconciler.clone()));
    let request_timeout = std::time::Duration::from_millis(config.server.request_timeout_ms);
    let state = AppState::new(routes, rpc_factory, health_checker, request_timeout);

    server::start_server(&config, state, reconciler).await?;

    info!("gateway shutdown complete");
    Ok(())
}

fn load_config() -> Result<GatewayConfig, Box<dyn std::error::Error + Send + Sync>> {
    let config = GatewayConfig::load().map_err(|e| format!("failed to load configuration: {}", e))?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        namespace = %config.namespace,
        "configuration loaded"
    );
    Ok(config)
}
