//! Error type definitions.
//!
//! This module defines all error types used throughout the application.

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// Boxed error returned by record writers.
///
/// Writers may be backed by any persistence technology, so the batch core only
/// requires that their errors be thread-safe and printable.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A pocket session with the same key was already stored.
    #[error("repeated session key")]
    RepeatedSessionKey,

    /// The requested row does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Table-level name of the missing entity
        entity: &'static str,
        /// Requested identifier
        id: i64,
    },
}

/// A record failed its own validation and was rejected before batching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field holds its zero value.
    #[error("{0} is not set")]
    MissingField(&'static str),

    /// A server-managed field was supplied by the client.
    #[error("{0} should not be set")]
    UnexpectedField(&'static str),
}

/// Invalid batch configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_size` must be at least 1.
    #[error("max batch size must be at least 1")]
    ZeroMaxSize,

    /// The intake channel needs room for at least one record.
    #[error("channel size must be at least 1")]
    ZeroChanSize,

    /// The time trigger must be a positive duration.
    #[error("max batch duration must be greater than zero")]
    ZeroMaxDuration,

    /// Every write needs a positive deadline.
    #[error("write timeout must be greater than zero")]
    ZeroWriteTimeout,

    /// Durations past the limit would overflow the timer deadlines.
    #[error("{field} of {secs}s exceeds the {max}s limit")]
    DurationTooLong {
        field: &'static str,
        secs: u64,
        max: u64,
    },
}

/// Errors produced by a [`Batch`](crate::batch::Batch).
///
/// `Validation` and `Closed` are returned to producers from `add`. The other
/// variants are flush-time failures: the affected records are dropped, logged
/// and counted as lost, and never retried.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The record failed validation and was not enqueued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The batch is shutting down and no longer accepts records.
    #[error("{0} batch is closed")]
    Closed(String),

    /// The writer reported an error.
    #[error("error writing {count} records: {source}")]
    Write {
        /// Number of records in the lost snapshot
        count: usize,
        /// Writer error
        #[source]
        source: BoxError,
    },

    /// The writer did not finish before its deadline.
    #[error("writing {count} records timed out after {timeout:?}")]
    Timeout {
        /// Number of records in the lost snapshot
        count: usize,
        /// Deadline that elapsed
        timeout: Duration,
    },

    /// The circuit breaker is open; the snapshot was dropped without writing.
    #[error("circuit breaker open, dropped {count} records")]
    CircuitOpen {
        /// Number of records in the dropped snapshot
        count: usize,
    },
}

impl BatchError {
    /// Number of records lost because of this error.
    ///
    /// Producer-side errors (`Validation`, `Closed`) lose nothing that was
    /// ever accepted, so they report zero.
    pub fn lost_records(&self) -> usize {
        match self {
            BatchError::Validation(_) | BatchError::Closed(_) => 0,
            BatchError::Write { count, .. }
            | BatchError::Timeout { count, .. }
            | BatchError::CircuitOpen { count } => *count,
        }
    }

    /// Whether the error was raised by the deadline rather than the writer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BatchError::Timeout { .. })
    }
}
