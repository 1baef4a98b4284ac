//! Serve command - Run the recorder
//!
//! Starts the exposition endpoint, then reconciles and ticks every derived
//! metric until SIGINT or SIGTERM.

use std::path::Path;

use anyhow::{Context, Result};
use sleeker_backend::PrometheusClient;
use sleeker_config::Config;
use sleeker_recorder::{Exposition, Recorder};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::exporter;

/// Run the serve command
pub async fn run(config: Config, config_path: &Path) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %config_path.display(),
        "sleeker starting"
    );

    if let Err(e) = run_recorder(config).await {
        error!(error = %e, "recorder error");
        return Err(e);
    }

    info!("sleeker shutdown complete");
    Ok(())
}

async fn run_recorder(config: Config) -> Result<()> {
    let cancel = CancellationToken::new();
    let exposition = Exposition::new();

    let backend =
        PrometheusClient::from_config(&config.prometheus).context("failed to create prometheus client")?;
    let recorder = Recorder::from_config(backend, &config, &exposition)
        .context("failed to register derived counters")?;

    let exporter_task = exporter::start(&config.exporter, exposition, cancel.clone())
        .await
        .context("failed to start exporter")?;

    info!(
        prometheus = %config.prometheus.base_url(),
        metrics = config.metrics.len(),
        interval = ?config.scheduler.interval,
        ttl = %config.options.ttl,
        "sleeker running"
    );

    let mut recorder_task = tokio::spawn(recorder.run(cancel.clone()));

    let outcome = tokio::select! {
        _ = wait_for_shutdown() => {
            info!("shutdown signal received, finishing current cycle...");
            cancel.cancel();
            recorder_task.await
        }
        joined = &mut recorder_task => joined,
    };

    // Stop the exporter whichever way the recorder ended
    cancel.cancel();
    if let Err(e) = exporter_task.await {
        warn!(error = %e, "exporter task panicked during shutdown");
    }

    match outcome {
        Ok(result) => result.context("recorder stopped"),
        Err(e) => Err(anyhow::anyhow!("recorder task panicked: {}", e)),
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
