//! Gateway main entry point.
//!
//! Minimal entry point that delegates to the application builder.

mod app;
mod config;
mod handlers;
mod health;
mod registry;
mod router;
mod rpc;

use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    app::init_telemetry();

    if let Err(e) = app::run().await {
        error!(error = %e, "gateway failed to start");
        process::exit(1);
    }
}
