//! Logging setup.
//!
//! Structured logging via `tracing-subscriber`, configured from `RUST_LOG`
//! (or a default level if unset or invalid).

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber. Must be called once, before any
/// other part of the application logs.
pub fn init_telemetry() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = create_env_filter(&log_level);
    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %log_level,
        "logging initialized"
    );
}

fn create_env_filter(log_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|e| {
            eprintln!(
                "invalid RUST_LOG value '{}': {}. using default 'info'",
                log_level, e
            );
            tracing_subscriber::EnvFilter::new("info")
        })
}
