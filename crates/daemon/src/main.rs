//! Phasewise Worker - Main Entry Point
//!
//! Composition root: wires the clock, the toggle source and the job
//! runner into the worker, then hands lifecycle control to the host
//! (ctrl-c for shutdown).

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use phasewise_core::application::worker::{constants, shutdown_channel, Worker};
use phasewise_core::port::time_provider::SystemTimeProvider;
use phasewise_core::port::{
    FixedDelayJob, JobRunner, MinuteParityToggle, TimeProvider, ToggleSource,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let log_format = std::env::var("PHASEWISE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("phasewise_core=info,phasewise_daemon=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Phasewise worker v{} starting...", VERSION);

    // 2. Setup dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let toggle: Arc<dyn ToggleSource> = Arc::new(MinuteParityToggle::new(time_provider));
    let job: Arc<dyn JobRunner> = Arc::new(FixedDelayJob::new(constants::JOB_DURATION));

    // 3. Build and start the worker
    info!("Starting worker...");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let mut worker = Worker::toggle_cycle(toggle, job, constants::TOGGLE_POLL_INTERVAL)
        .map_err(|e| anyhow::anyhow!("Worker configuration failed: {}", e))?;

    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(shutdown_rx).await {
            tracing::error!(error = ?e, "Worker failed");
        }
    });

    info!("Worker running. Press Ctrl+C to shutdown");

    // 4. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 5. Graceful shutdown: the worker parks at its next cancellation
    // check; give it a bounded window to get there
    shutdown_tx.shutdown();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), worker_handle).await;

    info!("Shutdown complete.");

    Ok(())
}
