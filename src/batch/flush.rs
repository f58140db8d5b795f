//! Buffer ownership and write dispatch.
//!
//! `Shared` holds everything the trigger loop and the public `flush` have in
//! common. The buffer swap happens under the buffer lock; the write itself
//! runs on its own task against a deadline after the lock is released.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error_handling::BatchError;
use crate::metrics::{BatchMetrics, MetricType};

use super::circuit_breaker::WriteCircuitBreaker;
use super::types::{BatchConfig, RecordWriter};

pub(crate) struct Shared<T: Send + 'static> {
    pub(crate) name: String,
    pub(crate) config: BatchConfig,
    buffer: Mutex<Vec<T>>,
    size: AtomicUsize,
    writer: Arc<dyn RecordWriter<T>>,
    metrics: Arc<BatchMetrics>,
    breaker: Option<WriteCircuitBreaker>,
}

impl<T: Send + 'static> Shared<T> {
    pub(crate) fn new(
        name: String,
        config: BatchConfig,
        writer: Arc<dyn RecordWriter<T>>,
        metrics: Arc<BatchMetrics>,
    ) -> Self {
        metrics.register(&name);
        let breaker = config
            .circuit_breaker
            .map(|breaker_config| WriteCircuitBreaker::new(&name, breaker_config));
        Shared {
            name,
            config,
            buffer: Mutex::new(Vec::new()),
            size: AtomicUsize::new(0),
            writer,
            metrics,
            breaker,
        }
    }

    /// Buffered record count. Advisory: races with the trigger loop.
    pub(crate) fn size(&self) -> usize {
        self.size.load(Ordering::SeqCst)
    }

    pub(crate) fn metrics(&self) -> &BatchMetrics {
        &self.metrics
    }

    /// Appends a record and returns the new buffer length.
    pub(crate) async fn push(&self, item: T) -> usize {
        let mut buffer = self.buffer.lock().await;
        buffer.push(item);
        let len = buffer.len();
        self.size.store(len, Ordering::SeqCst);
        len
    }

    /// Takes the whole buffer, leaving a fresh empty one behind.
    pub(crate) async fn take_snapshot(&self) -> Vec<T> {
        let mut buffer = self.buffer.lock().await;
        let items = std::mem::take(&mut *buffer);
        self.size.store(0, Ordering::SeqCst);
        items
    }

    /// Writes a snapshot under the configured deadline.
    ///
    /// Returns the number of records written. An empty snapshot is a no-op.
    /// On any failure the snapshot is dropped after being reported.
    pub(crate) async fn write_snapshot(self: Arc<Self>, items: Vec<T>) -> Result<usize, BatchError> {
        let count = items.len();
        if count == 0 {
            info!("no item was saved on {} batch: nothing to flush", self.name);
            return Ok(0);
        }

        if let Some(breaker) = &self.breaker {
            if breaker.is_circuit_open().await {
                let err = BatchError::CircuitOpen { count };
                self.report_failure(&err);
                return Err(err);
            }
        }

        debug!("Flushing {} batch of {} records", self.name, count);

        let timeout = self.config.write_timeout;
        let deadline = Instant::now() + timeout;
        let writer = Arc::clone(&self.writer);
        let mut task = tokio::spawn(async move { writer.write(deadline, items).await });

        let result = match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(Ok(Ok(()))) => Ok(count),
            Ok(Ok(Err(source))) => Err(BatchError::Write { count, source }),
            Ok(Err(join_error)) => Err(BatchError::Write {
                count,
                source: join_error.into(),
            }),
            Err(_) => {
                // cancels the backend call; sqlx rolls back a dropped transaction
                task.abort();
                Err(BatchError::Timeout { count, timeout })
            }
        };

        match &result {
            Ok(saved) => {
                self.metrics.add(&self.name, MetricType::Saved, *saved);
                if let Some(breaker) = &self.breaker {
                    breaker.record_success().await;
                }
                debug!("Successfully flushed {} {} records", saved, self.name);
            }
            Err(err) => {
                self.report_failure(err);
                if let Some(breaker) = &self.breaker {
                    breaker.record_failure().await;
                }
            }
        }

        result
    }

    pub(crate) fn report_failure(&self, err: &BatchError) {
        let lost = err.lost_records();
        error!(
            "error saving {} batch: {} ({} records lost)",
            self.name, err, lost
        );
        self.metrics.add(&self.name, MetricType::Lost, lost);
        self.metrics.increment(&self.name, MetricType::BatchFailed);
        if err.is_timeout() {
            self.metrics.increment(&self.name, MetricType::BatchTimedOut);
        }
    }
}
