//! `locgate serve` - run the HTTP gate.

use locgate_core::GateConfig;
use locgate_server::{AccessGate, GateServer};
use std::sync::Arc;

/// Serve until Ctrl-C.
pub async fn run(config: &GateConfig) -> anyhow::Result<()> {
    tracing::info!(
        data_file = %config.storage.path.display(),
        timezone = %config.policy.timezone,
        "Starting locgate"
    );

    let gate = Arc::new(AccessGate::from_config(config));
    let server = GateServer::new(config.server.bind.clone(), gate);
    server.run(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
