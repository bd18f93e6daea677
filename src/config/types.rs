use serde::{Deserialize, Serialize};

use super::constants::*;

/// Top-level gateway configuration.
///
/// Notably absent: the registry client and mux implementations. Those are
/// injected collaborators built by `main` and handed to the router directly;
/// they are not the kind of thing you deserialize out of a YAML file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Service-name prefix filter. Required: an empty namespace would make
    /// every service in the registry visible, which is never what an operator
    /// wants from a multi-tenant registry.
    pub namespace: String,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_SERVER_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_SERVER_PORT
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Tuning knobs for the reconciler's refresh and watch loops.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconcilerConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    #[serde(default = "default_watch_backoff")]
    pub watch_backoff_seconds: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: default_refresh_interval(),
            watch_backoff_seconds: default_watch_backoff(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECONDS
}

fn default_watch_backoff() -> u64 {
    DEFAULT_WATCH_BACKOFF_SECONDS
}

impl GatewayConfig {
    /// Validate cross-field invariants that `serde`'s defaults can't express.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.is_empty() {
            return Err(ERR_EMPTY_HOST.to_string());
        }
        if self.server.port == 0 {
            return Err(ERR_ZERO_PORT.to_string());
        }
        if self.namespace.is_empty() {
            return Err(ERR_EMPTY_NAMESPACE.to_string());
        }
        Ok(())
    }
}
