//! Data model returned by the registry: services, methods, HTTP bindings, nodes.

use serde::{Deserialize, Serialize};

/// One HTTP binding attached to an RPC method: declares how that RPC is
/// exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub http_method: String,
    pub path_template: String,
}

/// A single RPC method exposed by a service, with zero or more HTTP bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// A backend node (host:port) serving a service version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub address: String,
}

/// The registry's view of one `(service name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl ServiceDescriptor {
    /// Build the synthetic "this version is gone" descriptor the reconciler
    /// hands to `store` when a delete event hits a cache miss: empty methods
    /// and nodes, so the store operation's prune phase removes every route
    /// this version used to own.
    pub fn empty(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            methods: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Cache key for this descriptor: `"<name>:<version>"`.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

/// A lightweight entry returned by `list_services`, sufficient to drive a
/// per-name `get_service` lookup during the refresh loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub name: String,
}

/// The kind of change a watch event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// A single registry change event delivered by a `Watcher`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub action: Action,
    pub service: ServiceDescriptor,
}

/// Errors surfaced by the registry backend. `NotFound` is a distinguished
/// sentinel: the reconciler treats a `NotFound` on a `delete` event specially
/// (see `reconciler::process`).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("service not found")]
    NotFound,
    #[error("registry error: {0}")]
    Other(String),
}
