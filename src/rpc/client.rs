//! External collaborator: the RPC client factory.
//!
//! Dialing real backends (gRPC, Thrift, whatever the organization
//! standardizes on) is out of scope here. This module is the interface
//! contract plus a reference, version-aware, round-robin implementation used
//! by tests.
//!
//! No separate disposal method: implementations should tie connection
//! release to the returned `Arc<dyn Connection>`'s lifetime via `Drop`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::router::RouteTable;

use super::types::{RpcError, RpcResponse};

/// An open connection to one backend instance, constrained to a specific
/// version set at acquisition time.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Invoke `"/<service>/<method>"` with a JSON payload, requesting the
    /// JSON content-subtype on the wire. `headers` carries trace-propagation
    /// metadata. The response carries whatever headers and trailing metadata
    /// the backend attached, forwarded verbatim by the caller.
    async fn invoke(
        &self,
        service_method: &str,
        payload: Value,
        headers: &HashMap<String, String>,
    ) -> Result<RpcResponse, RpcError>;
}

/// Builds connections for a named service, constrained to an acceptable
/// version set. Load-balancing across nodes within that version set is the
/// factory's responsibility.
#[async_trait]
pub trait RpcClientFactory: Send + Sync {
    async fn client(
        &self,
        service_name: &str,
        versions: &[String],
    ) -> Result<Arc<dyn Connection>, RpcError>;

    /// One-shot hook invoked once at router construction: registers the
    /// route table as a name resolver so the factory can dial backends
    /// discovered via the registry by name, instead of from a static list.
    /// Implementations that resolve out-of-band (static config, DNS, a
    /// side-loaded service list) may no-op.
    async fn register_resolver(&self, routes: Arc<RouteTable>) -> Result<(), RpcError>;
}
