//! Batched record writes.
//!
//! A [`Batch`] accumulates records from concurrent producers and writes them
//! in bulk when either `max_size` records are buffered or `max_duration` has
//! elapsed since the last flush, whichever comes first.
//!
//! ```text
//! add() --validate--> intake (bounded) --> trigger loop --> buffer
//!                                              |
//!                         size / timer trigger v
//!                        snapshot --> write task (deadline) --> RecordWriter
//! ```
//!
//! Failed or timed-out writes are logged, counted as lost records and
//! dropped. They are not retried.

mod circuit_breaker;
mod flush;
mod types;
mod worker;

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{BatchError, ConfigError};
use crate::metrics::{BatchMetrics, MetricType};

use flush::Shared;
pub use types::{BatchConfig, CircuitBreakerConfig, RecordWriter, Validate};

/// Size- and time-triggered batch of records of type `T`.
///
/// The background loop starts in [`Batch::new`] and runs until
/// [`Batch::shutdown`] is called or the batch is dropped.
pub struct Batch<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    intake: mpsc::Sender<T>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Validate + Send + 'static> Batch<T> {
    /// Creates a batch and starts its trigger loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        name: impl Into<String>,
        config: BatchConfig,
        writer: Arc<dyn RecordWriter<T>>,
        metrics: Arc<BatchMetrics>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (intake, receiver) = mpsc::channel(config.chan_size);
        let shared = Arc::new(Shared::new(name.into(), config, writer, metrics));
        let shutdown = CancellationToken::new();
        let worker = tokio::spawn(worker::run_batcher(
            Arc::clone(&shared),
            receiver,
            shutdown.clone(),
        ));

        log::debug!(
            "{} batch started (max_size={}, chan_size={}, max_duration={:?}, write_timeout={:?})",
            shared.name,
            shared.config.max_size,
            shared.config.chan_size,
            shared.config.max_duration,
            shared.config.write_timeout
        );

        Ok(Batch {
            shared,
            intake,
            shutdown,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Validates a record and queues it for the next flush.
    ///
    /// Waits while the intake channel is full. Invalid records are rejected
    /// before they reach the queue.
    pub async fn add(&self, item: T) -> Result<(), BatchError> {
        item.validate()?;

        self.intake
            .send(item)
            .await
            .map_err(|_| BatchError::Closed(self.shared.name.clone()))?;
        self.shared
            .metrics()
            .increment(&self.shared.name, MetricType::Received);

        Ok(())
    }

    /// Number of buffered records not yet flushed.
    ///
    /// Records still waiting in the intake channel are not counted.
    pub fn size(&self) -> usize {
        self.shared.size()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Writes everything currently buffered and returns how many records were written.
    ///
    /// Safe to call concurrently with the trigger loop: the buffer swap is
    /// serialized by the buffer lock, and each snapshot belongs to exactly one
    /// flush.
    pub async fn flush(&self) -> Result<usize, BatchError> {
        let items = self.shared.take_snapshot().await;
        Arc::clone(&self.shared).write_snapshot(items).await
    }

    /// Stops the trigger loop and flushes every accepted record.
    ///
    /// The intake is closed first, so concurrent and later `add` calls fail
    /// with [`BatchError::Closed`]. Records already queued are drained into
    /// the buffer and written by one final flush. Calling it again is a no-op
    /// flush.
    pub async fn shutdown(&self) -> Result<usize, BatchError> {
        self.shutdown.cancel();

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                log::error!("{} batcher task failed: {}", self.shared.name, e);
            }
        }

        self.flush().await
    }
}
