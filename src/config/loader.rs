use config::{Config, Environment, File};

use super::constants::{CONFIG_ENV_PREFIX, CONFIG_PATH_ENV_VAR, DEFAULT_CONFIG_PATH};
use super::types::GatewayConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl GatewayConfig {
    /// Load configuration from a YAML file (path from `GATEWAY_CONFIG_PATH`,
    /// default `config/gateway.yaml`) with `GATEWAY_`-prefixed environment
    /// variable overrides (e.g. `GATEWAY_SERVER__PORT=9090`).
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).separator("__"))
            .build()?;

        let config: GatewayConfig = settings.try_deserialize()?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}
