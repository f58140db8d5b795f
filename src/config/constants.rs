//! Configuration constants.
//!
//! Defaults for the CLI options and the batch settings derived from them.

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Records buffered before a size-triggered flush
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Seconds between time-triggered flushes
pub const DEFAULT_BATCH_DURATION_SECS: u64 = 60;
/// Capacity of each batch's intake channel
pub const DEFAULT_CHAN_SIZE: usize = 1000;

/// Deadline in seconds for a single bulk write
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 60;
/// Longest batch duration or write timeout accepted (one year)
pub const MAX_BATCH_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound on pooled database connections
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Seconds an open circuit breaker drops batches before trying again
pub const DEFAULT_CIRCUIT_BREAKER_COOLDOWN_SECS: u64 = 60;

// Batch names, also used as metric label prefixes
pub const RELAY_BATCH_NAME: &str = "relay";
pub const SERVICE_RECORD_BATCH_NAME: &str = "service_record";
