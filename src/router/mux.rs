//! The pattern-dispatch multiplexer (the "Mux" half of C4).
//!
//! Modeled as an injected collaborator per the routing core's design: the
//! route table only ever calls `handle`/`handler_deregister`, never reaches
//! into global mux state. `PatternMux` is the reference implementation this
//! crate ships and runs against; it keeps its own internal locking so the
//! route table's write lock only has to serialize `store` against itself.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::pattern::RoutePattern;

/// What a matched `(method, pattern)` resolves to. Captured by value at
/// install time. Extending `service_versions` for an existing binding
/// requires re-installation; it is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub service_name: String,
    pub method_name: String,
    pub service_versions: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("failed to register handler for {method} {pattern}: {reason}")]
    RegistrationFailed {
        method: String,
        pattern: String,
        reason: String,
    },
}

/// External multiplexer contract. Implementations are expected to guarantee
/// their own safe concurrent reads while `handle`/`handler_deregister`
/// mutate; `PatternMux` does this with an internal read-write lock.
#[async_trait]
pub trait Mux: Send + Sync {
    async fn handle(
        &self,
        method: &str,
        pattern: RoutePattern,
        target: RouteTarget,
    ) -> Result<(), MuxError>;

    async fn handler_deregister(&self, method: &str, pattern: &RoutePattern);

    /// Resolve an incoming request to its target and extracted path params.
    async fn dispatch(&self, method: &str, path: &str) -> Option<(RouteTarget, HashMap<String, String>)>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StaticKey {
    method: String,
    path: String,
}

struct MuxState {
    static_routes: HashMap<StaticKey, RouteTarget>,
    dynamic_routes: Vec<(String, RoutePattern, RouteTarget)>,
}

/// Reference `Mux`: O(1) hash lookup for static patterns, linear scan over
/// dynamic ones. Mirrors the static/dynamic split of a conventional HTTP
/// router: most bindings in practice are static or have one or two
/// parameters, so the scan stays short.
pub struct PatternMux {
    state: RwLock<MuxState>,
}

impl PatternMux {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MuxState {
                static_routes: HashMap::new(),
                dynamic_routes: Vec::new(),
            }),
        }
    }
}

impl Default for PatternMux {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mux for PatternMux {
    async fn handle(
        &self,
        method: &str,
        pattern: RoutePattern,
        target: RouteTarget,
    ) -> Result<(), MuxError> {
        let mut state = self.state.write().await;
        if pattern.is_static() {
            let key = StaticKey {
                method: method.to_string(),
                path: pattern.canonical_string(),
            };
            state.dynamic_routes.retain(|(m, p, _)| {
                !(m == method && p.canonical_string() == pattern.canonical_string())
            });
            state.static_routes.insert(key, target);
        } else {
            let canonical = pattern.canonical_string();
            state
                .static_routes
                .remove(&StaticKey {
                    method: method.to_string(),
                    path: canonical.clone(),
                });
            state
                .dynamic_routes
                .retain(|(m, p, _)| !(m == method && p.canonical_string() == canonical));
            state.dynamic_routes.push((method.to_string(), pattern, target));
        }
        Ok(())
    }

    async fn handler_deregister(&self, method: &str, pattern: &RoutePattern) {
        let mut state = self.state.write().await;
        let canonical = pattern.canonical_string();
        state.static_routes.remove(&StaticKey {
            method: method.to_string(),
            path: canonical.clone(),
        });
        state
            .dynamic_routes
            .retain(|(m, p, _)| !(m == method && p.canonical_string() == canonical));
    }

    async fn dispatch(&self, method: &str, path: &str) -> Option<(RouteTarget, HashMap<String, String>)> {
        let state = self.state.read().await;

        let key = StaticKey {
            method: method.to_string(),
            path: path.to_string(),
        };
        if let Some(target) = state.static_routes.get(&key) {
            return Some((target.clone(), HashMap::new()));
        }

        for (m, pattern, target) in &state.dynamic_routes {
            if m != method {
                continue;
            }
            if let Some(params) = pattern.matches(path) {
                return Some((target.clone(), params));
            }
        }

        None
    }
}
