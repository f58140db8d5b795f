//! Application wiring.
//!
//! Builds the storage layer, both batches and the server state from a
//! [`Config`], then runs the HTTP server until a shutdown signal arrives.

pub mod shutdown;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::batch::Batch;
use crate::config::{Config, RELAY_BATCH_NAME, SERVICE_RECORD_BATCH_NAME};
use crate::metrics::BatchMetrics;
use crate::server::{self, AppState};
use crate::storage::{init_db_pool, run_migrations, SqliteDriver};
use crate::types::{Relay, ServiceRecord};

pub use shutdown::{shutdown_gracefully, wait_for_signal};

/// Connects to the database, applies migrations and starts both batches.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let api_keys: HashSet<String> = config.authorized_keys().into_iter().collect();
    if api_keys.is_empty() {
        anyhow::bail!("at least one API key is required");
    }

    let pool = init_db_pool(&config.connection_string, config.db_max_connections)
        .await
        .context("Failed to initialize database pool")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let driver = SqliteDriver::new(pool);

    let metrics = Arc::new(BatchMetrics::new());
    let relay_batch = Batch::<Relay>::new(
        RELAY_BATCH_NAME,
        config.relay_batch_config(),
        Arc::new(driver.clone()),
        Arc::clone(&metrics),
    )
    .context("Invalid relay batch configuration")?;
    let service_record_batch = Batch::<ServiceRecord>::new(
        SERVICE_RECORD_BATCH_NAME,
        config.service_record_batch_config(),
        Arc::new(driver.clone()),
        Arc::clone(&metrics),
    )
    .context("Invalid service record batch configuration")?;

    Ok(AppState {
        driver,
        relay_batch: Arc::new(relay_batch),
        service_record_batch: Arc::new(service_record_batch),
        metrics,
        api_keys: Arc::new(api_keys),
    })
}

/// Serves `state` on `listener` until `signal` resolves, then shuts down
/// gracefully.
pub async fn run_until<F>(listener: TcpListener, state: AppState, signal: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let cancel = CancellationToken::new();
    let server_task = tokio::spawn(server::serve(listener, state.clone(), cancel.clone()));

    signal.await;
    shutdown_gracefully(cancel, server_task, &state).await;
    info!("Shutdown complete");
    Ok(())
}

/// Runs the service with `config` until Ctrl+C or SIGTERM.
pub async fn run_server(config: Config) -> Result<()> {
    let state = build_state(&config).await?;
    let listener = server::bind(config.port).await?;
    run_until(listener, state, wait_for_signal()).await
}
