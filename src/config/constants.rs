//! Default values and validation messages for configuration fields.

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Full refresh cadence: 10 minutes, per the reconciler's refresh loop.
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 600;

/// Base unit for the watch/refresh loops' linear backoff (`attempts * base`).
pub const DEFAULT_WATCH_BACKOFF_SECONDS: u64 = 1;

pub const CONFIG_PATH_ENV_VAR: &str = "GATEWAY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";
pub const CONFIG_ENV_PREFIX: &str = "GATEWAY";

pub const ERR_EMPTY_HOST: &str = "server host cannot be empty";
pub const ERR_ZERO_PORT: &str = "server port must be greater than 0";
pub const ERR_EMPTY_NAMESPACE: &str = "namespace cannot be empty";
