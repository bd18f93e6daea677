//! Read-through cache over the registry, keyed by service name (C2).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::client::RegistryClient;
use super::types::{RegistryError, ServiceDescriptor};

/// De-duplicates and caches service descriptors. Performs no retries itself,
/// that's the reconciler's job; it just propagates registry errors upward
/// and tolerates being asked to stop mid-flight.
pub struct ServiceCache {
    registry: Arc<dyn RegistryClient>,
    entries: RwLock<HashMap<String, Vec<ServiceDescriptor>>>,
    shutdown: CancellationToken,
}

impl ServiceCache {
    pub fn new(registry: Arc<dyn RegistryClient>) -> Self {
        Self {
            registry,
            entries: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Return the current descriptor set for `name`, querying the registry
    /// and refreshing the local entry. `RegistryError::NotFound` is
    /// propagated as-is so callers (the reconciler) can distinguish "gone"
    /// from "transient failure".
    pub async fn get_service(&self, name: &str) -> Result<Vec<ServiceDescriptor>, RegistryError> {
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                debug!(service = %name, "service cache stopped, aborting in-flight lookup");
                return Err(RegistryError::Other("service cache stopped".to_string()));
            }
            result = self.registry.get_service(name) => result,
        };

        match &result {
            Ok(descriptors) => {
                let mut entries = self.entries.write().await;
                entries.insert(name.to_string(), descriptors.clone());
            }
            Err(RegistryError::NotFound) => {
                let mut entries = self.entries.write().await;
                entries.remove(name);
            }
            Err(_) => {}
        }

        result
    }

    /// Unblocks any in-flight registry call and prevents new ones.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::mock::MockRegistry;
    use crate::registry::types::ServiceDescriptor;

    #[tokio::test]
    async fn caches_successful_lookups() {
        let registry = Arc::new(MockRegistry::new());
        registry.upsert(ServiceDescriptor::empty("ns.foo", "v1"));
        let cache = ServiceCache::new(registry.clone());

        let descriptors = cache.get_service("ns.foo").await.unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].version, "v1");
    }

    #[tokio::test]
    async fn propagates_not_found() {
        let registry = Arc::new(MockRegistry::new());
        let cache = ServiceCache::new(registry);

        let result = cache.get_service("ns.missing").await;
        assert!(matches!(result, Err(RegistryError::NotFound)));
    }

    #[tokio::test]
    async fn stop_unblocks_in_flight_calls() {
        let registry = Arc::new(MockRegistry::new());
        let cache = Arc::new(ServiceCache::new(registry));

        cache.stop();
        let result = cache.get_service("ns.foo").await;
        assert!(result.is_err());
    }
}
