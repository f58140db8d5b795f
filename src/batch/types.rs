//! Batch configuration and the capabilities a batch consumes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::config::{
    DEFAULT_BATCH_DURATION_SECS, DEFAULT_BATCH_SIZE, DEFAULT_CHAN_SIZE, DEFAULT_DB_TIMEOUT_SECS,
    MAX_BATCH_INTERVAL_SECS,
};
use crate::error_handling::{BoxError, ConfigError, ValidationError};

/// A record that can check itself before it is accepted into a batch.
pub trait Validate {
    /// Returns the first problem found, or `Ok(())` for a well-formed record.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Persists a whole snapshot of records in one call.
///
/// `deadline` is the instant at which the batch gives up on the write. The
/// batch enforces it on its own, so implementations may ignore it, but a
/// writer that can pass it down to its backend should.
#[async_trait]
pub trait RecordWriter<T: Send + 'static>: Send + Sync {
    async fn write(&self, deadline: Instant, items: Vec<T>) -> Result<(), BoxError>;
}

/// Settings for the optional write circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed flushes before the circuit opens
    pub failure_threshold: u32,
    /// How long an open circuit drops batches before allowing another write
    pub cooldown: Duration,
}

/// Configuration for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of buffered records that triggers a flush
    pub max_size: usize,
    /// Capacity of the intake channel; producers wait when it is full
    pub chan_size: usize,
    /// Interval between time-triggered flushes
    pub max_duration: Duration,
    /// Deadline applied to every write
    pub write_timeout: Duration,
    /// Disabled when `None`
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_size: DEFAULT_BATCH_SIZE,
            chan_size: DEFAULT_CHAN_SIZE,
            max_duration: Duration::from_secs(DEFAULT_BATCH_DURATION_SECS),
            write_timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
            circuit_breaker: None,
        }
    }
}

impl BatchConfig {
    /// Checks the invariants the batch relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::ZeroMaxSize);
        }
        if self.chan_size == 0 {
            return Err(ConfigError::ZeroChanSize);
        }
        if self.max_duration.is_zero() {
            return Err(ConfigError::ZeroMaxDuration);
        }
        if self.write_timeout.is_zero() {
            return Err(ConfigError::ZeroWriteTimeout);
        }
        check_interval("max batch duration", self.max_duration)?;
        check_interval("write timeout", self.write_timeout)?;
        Ok(())
    }
}

fn check_interval(field: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value > Duration::from_secs(MAX_BATCH_INTERVAL_SECS) {
        return Err(ConfigError::DurationTooLong {
            field,
            secs: value.as_secs(),
            max: MAX_BATCH_INTERVAL_SECS,
        });
    }
    Ok(())
}
