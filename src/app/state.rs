//! Shared application state handed to every axum handler.

use std::sync::Arc;
use std::time::Duration;

use crate::health::HealthChecker;
use crate::router::RouteTable;
use crate::rpc::RpcClientFactory;

/// Cloned per request by axum's `State` extractor; every field that isn't
/// `Copy` is an `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub rpc_factory: Arc<dyn RpcClientFactory>,
    pub health_checker: Arc<HealthChecker>,
    /// Upper bound on how long the transcoding handler waits on a single RPC
    /// invocation before treating it as failed.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        routes: Arc<RouteTable>,
        rpc_factory: Arc<dyn RpcClientFactory>,
        health_checker: Arc<HealthChecker>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            routes,
            rpc_factory,
            health_checker,
            request_timeout,
        }
    }
}
