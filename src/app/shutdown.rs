//! Graceful shutdown handling.

use log::{error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::batch::{Batch, Validate};
use crate::server::AppState;

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_ctrl_c(result),
                    _ = terminate.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                log_ctrl_c(tokio::signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    log_ctrl_c(tokio::signal::ctrl_c().await);
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("Received CTRL+C, shutting down..."),
        Err(e) => error!("Failed to listen for CTRL+C: {}", e),
    }
}

/// Stops the HTTP server, then drains and flushes both batches.
///
/// The server goes first so no request can add records after its batch has
/// been drained. The two batches are flushed concurrently.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    server_task: JoinHandle<Result<(), anyhow::Error>>,
    state: &AppState,
) {
    cancel.cancel();
    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("{:#}", e),
        Err(e) => error!("HTTP server task failed: {}", e),
    }

    tokio::join!(
        shutdown_batch(&state.relay_batch),
        shutdown_batch(&state.service_record_batch),
    );
}

async fn shutdown_batch<T: Validate + Send + 'static>(batch: &Batch<T>) {
    match batch.shutdown().await {
        Ok(count) => info!("{} batch closed, saved {} final records", batch.name(), count),
        Err(e) => error!("Error saving {} batch: {}", batch.name(), e),
    }
}
