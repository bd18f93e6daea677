//! In-memory `RegistryClient`/`Watcher` implementation.
//!
//! A real deployment points the gateway at its own registry backend; this
//! one is used by tests and by the default binary wiring, since a concrete
//! backend is an external collaborator out of scope for this core.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::client::{RegistryClient, Watcher};
use super::types::{Event, RegistryError, ServiceDescriptor, ServiceSummary};

/// Keyed by service name, holding every version registered under that name.
pub struct MockRegistry {
    services: Mutex<HashMap<String, Vec<ServiceDescriptor>>>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            services: Mutex::new(HashMap::new()),
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// Insert or replace a descriptor, keyed by `(name, version)`, and fan the
    /// change out to every open watcher as an `update` event.
    pub fn upsert(&self, descriptor: ServiceDescriptor) {
        self.publish(descriptor, super::types::Action::Update);
    }

    pub fn remove(&self, descriptor: ServiceDescriptor) {
        {
            let mut services = self.services.lock().unwrap();
            if let Some(versions) = services.get_mut(&descriptor.name) {
                versions.retain(|d| d.version != descriptor.version);
            }
        }
        self.publish(descriptor, super::types::Action::Delete);
    }

    fn publish(&self, descriptor: ServiceDescriptor, action: super::types::Action) {
        if !matches!(action, super::types::Action::Delete) {
            let mut services = self.services.lock().unwrap();
            let versions = services.entry(descriptor.name.clone()).or_default();
            versions.retain(|d| d.version != descriptor.version);
            versions.push(descriptor.clone());
        }

        let watchers = self.watchers.lock().unwrap();
        for tx in watchers.iter() {
            let _ = tx.send(Event {
                action,
                service: descriptor.clone(),
            });
        }
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn list_services(&self) -> Result<Vec<ServiceSummary>, RegistryError> {
        let services = self.services.lock().unwrap();
        Ok(services
            .keys()
            .map(|name| ServiceSummary { name: name.clone() })
            .collect())
    }

    async fn get_service(&self, name: &str) -> Result<Vec<ServiceDescriptor>, RegistryError> {
        let services = self.services.lock().unwrap();
        match services.get(name) {
            Some(versions) if !versions.is_empty() => Ok(versions.clone()),
            _ => Err(RegistryError::NotFound),
        }
    }

    async fn watch(&self) -> Result<Box<dyn Watcher>, RegistryError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.lock().unwrap().push(tx);
        Ok(Box::new(MockWatcher { rx }))
    }
}

pub struct MockWatcher {
    rx: mpsc::UnboundedReceiver<Event>,
}

#[async_trait]
impl Watcher for MockWatcher {
    async fn next(&mut self) -> Result<Event, RegistryError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| RegistryError::Other("watch stream closed".to_string()))
    }

    fn stop(&self) {
        self.rx.close();
    }
}
