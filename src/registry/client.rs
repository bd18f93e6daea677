//! External collaborator: the service registry backend (consul/etcd/etc).
//!
//! This module defines the interface contract only. A concrete backend is
//! wired in by the binary that embeds this gateway; tests use the in-memory
//! double in `mock`.

use async_trait::async_trait;

use super::types::{Event, RegistryError, ServiceDescriptor, ServiceSummary};

/// A handle to an open watch stream. Events arrive in order; `next` blocks
/// until one is available or the stream errors.
#[async_trait]
pub trait Watcher: Send {
    async fn next(&mut self) -> Result<Event, RegistryError>;
    fn stop(&self);
}

/// The registry backend. Talking to consul/etcd/whatever is out of scope
/// here; this crate only depends on the contract.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn list_services(&self) -> Result<Vec<ServiceSummary>, RegistryError>;

    /// All descriptors (one per version) currently registered under `name`.
    async fn get_service(&self, name: &str) -> Result<Vec<ServiceDescriptor>, RegistryError>;

    async fn watch(&self) -> Result<Box<dyn Watcher>, RegistryError>;
}
