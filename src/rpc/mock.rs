//! Reference, version-aware, round-robin `RpcClientFactory`.
//!
//! Mirrors `grpc::pool::ConnectionPool`'s round-robin selection, generalized
//! to pick among only the nodes whose version is in the route's acceptable
//! set. A real deployment dials actual backends (gRPC, Thrift, ...); this
//! factory and `EchoConnection` exist for tests and for the default binary
//! wiring, since a concrete RPC client is an external collaborator out of
//! scope for this core.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use crate::router::RouteTable;

use super::client::{Connection, RpcClientFactory};
use super::types::{RpcError, RpcResponse};

struct Node {
    version: String,
    conn: Arc<dyn Connection>,
}

/// An in-memory backend registry for tests: register nodes per service
/// version, then resolve clients the same way a real factory would.
pub struct RoundRobinFactory {
    nodes: RwLock<HashMap<String, Vec<Node>>>,
    next_index: AtomicUsize,
}

impl RoundRobinFactory {
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            next_index: AtomicUsize::new(0),
        }
    }

    pub async fn register_node(&self, service_name: &str, version: &str, conn: Arc<dyn Connection>) {
        let mut nodes = self.nodes.write().await;
        nodes.entry(service_name.to_string()).or_default().push(Node {
            version: version.to_string(),
            conn,
        });
    }
}

impl Default for RoundRobinFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcClientFactory for RoundRobinFactory {
    async fn client(
        &self,
        service_name: &str,
        versions: &[String],
    ) -> Result<Arc<dyn Connection>, RpcError> {
        let nodes = self.nodes.read().await;
        let candidates: Vec<&Node> = nodes
            .get(service_name)
            .into_iter()
            .flatten()
            .filter(|n| versions.contains(&n.version))
            .collect();

        if candidates.is_empty() {
            return Err(RpcError::NoBackend {
                service: service_name.to_string(),
                versions: versions.to_vec(),
            });
        }

        let index = self.next_index.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Ok(candidates[index].conn.clone())
    }

    /// No-op: this factory's nodes are registered directly via
    /// `register_node`, not resolved from the route table.
    async fn register_resolver(&self, _routes: Arc<RouteTable>) -> Result<(), RpcError> {
        Ok(())
    }
}

/// A `Connection` double that echoes the payload back under a `result` key,
/// useful for asserting what the handler actually sent.
pub struct EchoConnection;

#[async_trait]
impl Connection for EchoConnection {
    async fn invoke(
        &self,
        service_method: &str,
        payload: serde_json::Value,
        _headers: &HashMap<String, String>,
    ) -> Result<RpcResponse, RpcError> {
        Ok(RpcResponse::new(
            json!({ "invoked": service_method, "payload": payload }),
        ))
    }
}
