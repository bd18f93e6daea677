//! Registry reconciliation: keeps the route table in sync with an external
//! service registry via a periodic full refresh plus an incremental watch
//! stream.

mod cache;
mod client;
mod reconciler;
mod types;

pub mod mock;


pub use cache::ServiceCache;
pub use client::{RegistryClient, Watcher};
pub use reconciler::{Reconciler, ReconcilerSettings};
pub use types::{Action, Binding, Event, MethodDescriptor, Node, RegistryError, ServiceDescriptor, ServiceSummary};
