//! Route table: owns the `(method, pattern) → route` index and drives
//! registration into an injected mux.
//!
//! # Concurrency
//!
//! `store` is only ever called by the reconciler, which serializes updates
//! against itself; it is never invoked concurrently with itself. HTTP
//! dispatch never touches this table's lock at all; it goes straight to the
//! mux, which guarantees its own safe concurrent reads (see `mux::PatternMux`).
//! The write lock here exists to keep `endpoints`/`routes` bookkeeping
//! consistent with the mux's own state during `store`.

mod decision;
mod mux;
mod pattern;

#[cfg(test)]
mod tests;

pub use decision::{RouterError, RoutingDecision};
pub use mux::{Mux, MuxError, PatternMux, RouteTarget};
pub use pattern::{PathSegment, PatternError, RoutePattern};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::registry::ServiceDescriptor;

/// A stored mapping from `(method, pattern)` to `(service name, RPC method,
/// version set)`.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: String,
    pub pattern: RoutePattern,
    pub service_name: String,
    pub method_name: String,
    pub service_versions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: String,
    pattern: String,
}

struct Inner {
    endpoints: HashMap<String, ServiceDescriptor>,
    routes: HashMap<RouteKey, Route>,
}

/// Owns the two maps described in the component design: `endpoints`
/// (`name:version → ServiceDescriptor`) and `routes` (`method:pattern →
/// Route`), plus the mux those routes are installed into.
pub struct RouteTable {
    mux: Arc<dyn Mux>,
    inner: RwLock<Inner>,
}

impl RouteTable {
    pub fn new(mux: Arc<dyn Mux>) -> Self {
        Self {
            mux,
            inner: RwLock::new(Inner {
                endpoints: HashMap::new(),
                routes: HashMap::new(),
            }),
        }
    }

    /// Resolve an incoming request via the mux. Bypasses this table's lock
    /// entirely, per the concurrency contract.
    pub async fn route(&self, method: &str, path: &str) -> Result<RoutingDecision, RouterError> {
        match self.mux.dispatch(&method.to_uppercase(), path).await {
            Some((target, path_params)) => Ok(RoutingDecision::new(
                target.service_name,
                target.method_name,
                Arc::from(target.service_versions),
                path_params,
            )),
            None => Err(RouterError::RouteNotFound {
                path: path.to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// Current route count, for the health endpoint.
    pub async fn route_count(&self) -> usize {
        self.inner.read().await.routes.len()
    }

    #[cfg(test)]
    pub async fn endpoint_count(&self) -> usize {
        self.inner.read().await.endpoints.len()
    }

    /// The heart of the core: install every binding reachable from
    /// `services` (all versions of one service name) and prune any binding
    /// that used to belong to that service but no longer appears.
    ///
    /// This is additive + targeted-prune, never a global diff: only patterns
    /// reachable from `services` are touched, so the cost is proportional to
    /// the bindings in this one service, not the whole table.
    pub async fn store(&self, services: Vec<ServiceDescriptor>) {
        let mut new_routes: HashMap<RouteKey, Route> = HashMap::new();

        for descriptor in &services {
            for method in &descriptor.methods {
                for binding in &method.bindings {
                    let pattern = match RoutePattern::parse(&binding.path_template) {
                        Ok(pattern) => pattern,
                        Err(err) => {
                            warn!(
                                service = %descriptor.name,
                                version = %descriptor.version,
                                template = %binding.path_template,
                                error = %err,
                                "skipping malformed binding"
                            );
                            continue;
                        }
                    };
                    let key = RouteKey {
                        method: binding.http_method.to_uppercase(),
                        pattern: pattern.canonical_string(),
                    };

                    match new_routes.get_mut(&key) {
                        Some(existing) if existing.service_name == descriptor.name
                            && existing.method_name == method.name =>
                        {
                            if !existing
                                .service_versions
                                .contains(&descriptor.version)
                            {
                                existing.service_versions.push(descriptor.version.clone());
                            }
                        }
                        Some(existing) => {
                            warn!(
                                method = %key.method,
                                pattern = %key.pattern,
                                incumbent_service = %existing.service_name,
                                rejected_service = %descriptor.name,
                                "binding collision within store pass, first writer wins"
                            );
                        }
                        None => {
                            new_routes.insert(
                                key,
                                Route {
                                    method: binding.http_method.to_uppercase(),
                                    pattern,
                                    service_name: descriptor.name.clone(),
                                    method_name: method.name.clone(),
                                    service_versions: vec![descriptor.version.clone()],
                                },
                            );
                        }
                    }
                }
            }
        }

        let new_endpoints: HashMap<String, ServiceDescriptor> = services
            .into_iter()
            .map(|d| (d.cache_key(), d))
            .collect();

        let mut inner = self.inner.write().await;

        // Install phase.
        for (key, route) in &new_routes {
            if let Some(incumbent) = inner.routes.get(key) {
                if incumbent.service_name != route.service_name {
                    warn!(
                        method = %key.method,
                        pattern = %key.pattern,
                        incumbent_service = %incumbent.service_name,
                        rejected_service = %route.service_name,
                        "binding collision against existing route, existing route kept"
                    );
                    continue;
                }
            }

            let target = RouteTarget {
                service_name: route.service_name.clone(),
                method_name: route.method_name.clone(),
                service_versions: route.service_versions.clone(),
            };
            if let Err(err) = self
                .mux
                .handle(&route.method, route.pattern.clone(), target)
                .await
            {
                warn!(method = %key.method, pattern = %key.pattern, error = %err, "mux registration failed, retrying on next reconciliation");
            }
            inner.routes.insert(key.clone(), route.clone());
        }

        // Prune phase: for each touched endpoint, remove bindings the old
        // descriptor had that the new pass didn't reinstall, but only if we
        // still own that key.
        for (endpoint_key, descriptor) in &new_endpoints {
            let Some(old) = inner.endpoints.get(endpoint_key).cloned() else {
                continue;
            };

            for method in &old.methods {
                for binding in &method.bindings {
                    let Ok(pattern) = RoutePattern::parse(&binding.path_template) else {
                        continue;
                    };
                    let key = RouteKey {
                        method: binding.http_method.to_uppercase(),
                        pattern: pattern.canonical_string(),
                    };

                    if new_routes.contains_key(&key) {
                        continue;
                    }

                    let still_ours = inner
                        .routes
                        .get(&key)
                        .map(|r| r.service_name == descriptor.name)
                        .unwrap_or(false);
                    if !still_ours {
                        continue;
                    }

                    self.mux.handler_deregister(&key.method, &pattern).await;
                    inner.routes.remove(&key);
                }
            }
        }

        for (key, descriptor) in new_endpoints {
            inner.endpoints.insert(key, descriptor);
        }
    }
}
