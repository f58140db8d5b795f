//! Circuit breaker for batch writes.
//!
//! After N consecutive failed flushes the circuit opens and flushes drop their
//! snapshot without calling the writer until the cooldown expires. Dropped
//! snapshots are still counted as lost records.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::types::CircuitBreakerConfig;

/// Tracks consecutive write failures for one batch.
pub(crate) struct WriteCircuitBreaker {
    name: String,
    failure_threshold: u32,
    cooldown: Duration,
    failure_count: AtomicU32,
    is_open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl WriteCircuitBreaker {
    pub(crate) fn new(name: &str, config: CircuitBreakerConfig) -> Self {
        WriteCircuitBreaker {
            name: name.to_string(),
            failure_threshold: config.failure_threshold.max(1),
            cooldown: config.cooldown,
            failure_count: AtomicU32::new(0),
            is_open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    /// Resets the failure count and closes the circuit if it was open.
    pub(crate) async fn record_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);
        if self.is_open.swap(false, Ordering::SeqCst) {
            *self.opened_at.write().await = None;
            log::info!(
                "{} batch circuit breaker: circuit closed after successful write",
                self.name
            );
        }
    }

    /// Counts a failed flush and opens the circuit once the threshold is hit.
    pub(crate) async fn record_failure(&self) {
        let count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;

        if count >= self.failure_threshold && !self.is_open.swap(true, Ordering::SeqCst) {
            *self.opened_at.write().await = Some(Instant::now());
            log::error!(
                "{} batch circuit breaker: circuit opened after {} consecutive failures (cooldown: {}s)",
                self.name,
                count,
                self.cooldown.as_secs()
            );
        }
    }

    /// Returns `true` while the circuit is open and the cooldown has not expired.
    ///
    /// Once the cooldown expires the circuit lets the next write through; a
    /// failure of that write reopens it immediately because the failure count
    /// is still above the threshold.
    pub(crate) async fn is_circuit_open(&self) -> bool {
        if !self.is_open.load(Ordering::SeqCst) {
            return false;
        }

        let opened_at = self.opened_at.read().await;
        if let Some(opened) = *opened_at {
            if opened.elapsed() >= self.cooldown {
                log::info!(
                    "{} batch circuit breaker: cooldown expired, attempting to close circuit",
                    self.name
                );
                self.is_open.store(false, Ordering::SeqCst);
                return false;
            }
        }

        true
    }

    #[cfg(test)]
    pub(crate) fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }
}
