//! Batch write metrics.
//!
//! Thread-safe counters for saved and lost records per batch, plus a
//! Prometheus text renderer used by the `/metrics` endpoint. Counters are
//! purely observational: nothing in the batch core reads them back.

mod render;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

pub use render::render_prometheus;

/// Prefix of every exported metric name.
pub const METRIC_NAMESPACE: &str = "http_txdb";

/// Counters tracked for each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum MetricType {
    /// Records accepted by `add` and queued for batching.
    Received,
    /// Records written successfully.
    Saved,
    /// Records dropped because their flush failed, timed out or was skipped.
    Lost,
    /// Flushes that ended in an error.
    BatchFailed,
    /// Flushes that ended in a timeout (also counted in `BatchFailed`).
    BatchTimedOut,
}

impl MetricType {
    /// Suffix appended to the batch name to form the metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Received => "received",
            MetricType::Saved => "saved",
            MetricType::Lost => "lost",
            MetricType::BatchFailed => "batch_failed",
            MetricType::BatchTimedOut => "batch_timed_out",
        }
    }

    /// Whether the counter belongs to the error family rather than data.
    pub fn is_error(&self) -> bool {
        matches!(self, MetricType::BatchFailed | MetricType::BatchTimedOut)
    }
}

type Counters = BTreeMap<MetricType, AtomicUsize>;

/// Thread-safe metrics registry shared by all batches.
///
/// Each batch registers its name once at construction; increments after that
/// only take the read lock.
#[derive(Default)]
pub struct BatchMetrics {
    batches: RwLock<BTreeMap<String, Counters>>,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a batch so its counters are exported even before any traffic.
    pub fn register(&self, batch: &str) {
        let mut batches = match self.batches.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        batches.entry(batch.to_string()).or_insert_with(|| {
            MetricType::iter()
                .map(|metric| (metric, AtomicUsize::new(0)))
                .collect()
        });
    }

    /// Adds `value` to a counter.
    pub fn add(&self, batch: &str, metric: MetricType, value: usize) {
        let batches = match self.batches.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(counter) = batches.get(batch).and_then(|c| c.get(&metric)) {
            counter.fetch_add(value, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment {:?} for unregistered batch {}",
                metric,
                batch
            );
        }
    }

    /// Increments a counter by one.
    pub fn increment(&self, batch: &str, metric: MetricType) {
        self.add(batch, metric, 1);
    }

    /// Current value of a counter, 0 for unknown batches.
    pub fn get(&self, batch: &str, metric: MetricType) -> usize {
        let batches = match self.batches.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        batches
            .get(batch)
            .and_then(|c| c.get(&metric))
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Point-in-time copy of every counter, ordered by batch then metric.
    pub fn snapshot(&self) -> Vec<(String, MetricType, usize)> {
        let batches = match self.batches.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        batches
            .iter()
            .flat_map(|(name, counters)| {
                counters
                    .iter()
                    .map(move |(metric, value)| (name.clone(), *metric, value.load(Ordering::SeqCst)))
            })
            .collect()
    }
}
