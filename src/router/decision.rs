//! Routing decision types and errors.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during routing.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no route for {method} {path}")]
    RouteNotFound { path: String, method: String },
}

/// Result of a successful route match: which backend to call, and the path
/// parameters extracted from the URL.
///
/// `service_name`/`method_name` are `Arc<str>` to keep the hot dispatch path
/// free of string-allocation cost; cloning an `Arc` is an atomic increment.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub service_name: Arc<str>,
    pub method_name: Arc<str>,
    pub service_versions: Arc<[String]>,
    pub path_params: HashMap<String, String>,
}

impl RoutingDecision {
    pub fn new(
        service_name: impl AsRef<str>,
        method_name: impl AsRef<str>,
        service_versions: Arc<[String]>,
        path_params: HashMap<String, String>,
    ) -> Self {
        Self {
            service_name: Arc::from(service_name.as_ref()),
            method_name: Arc::from(method_name.as_ref()),
            service_versions,
            path_params,
        }
    }
}
