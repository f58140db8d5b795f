//! Configuration types and CLI options.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it; `main` loads a `.env` file first so both work.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::batch::{BatchConfig, CircuitBreakerConfig};
use crate::config::constants::{
    DEFAULT_BATCH_DURATION_SECS, DEFAULT_BATCH_SIZE, DEFAULT_CHAN_SIZE,
    DEFAULT_CIRCUIT_BREAKER_COOLDOWN_SECS, DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_TIMEOUT_SECS,
    DEFAULT_PORT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: One JSON object per line for log shippers
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options and configuration.
///
/// # Examples
///
/// ```bash
/// # Minimal
/// transaction_http_db --connection-string sqlite://txdb.db --api-keys key1,key2
///
/// # Smaller, more frequent relay batches
/// MAX_RELAY_BATCH_SIZE=100 MAX_RELAY_BATCH_DURATION=5 transaction_http_db ...
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "transaction_http_db",
    about = "Batches relay and service records received over HTTP into a SQL database."
)]
pub struct Config {
    /// SQLite database URL or file path
    #[arg(long, env = "CONNECTION_STRING")]
    pub connection_string: String,

    /// Comma separated API keys accepted in the Authorization header
    #[arg(long, env = "API_KEYS", value_delimiter = ',', required = true)]
    pub api_keys: Vec<String>,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Relays buffered before a flush
    #[arg(long, env = "MAX_RELAY_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub max_relay_batch_size: usize,

    /// Seconds between relay flushes
    #[arg(long, env = "MAX_RELAY_BATCH_DURATION", default_value_t = DEFAULT_BATCH_DURATION_SECS)]
    pub max_relay_batch_duration: u64,

    /// Service records buffered before a flush
    #[arg(long, env = "MAX_SERVICE_RECORD_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub max_service_record_batch_size: usize,

    /// Seconds between service record flushes
    #[arg(
        long,
        env = "MAX_SERVICE_RECORD_BATCH_DURATION",
        default_value_t = DEFAULT_BATCH_DURATION_SECS
    )]
    pub max_service_record_batch_duration: u64,

    /// Capacity of each batch's intake channel
    #[arg(long, env = "CHAN_SIZE", default_value_t = DEFAULT_CHAN_SIZE)]
    pub chan_size: usize,

    /// Seconds allowed for one bulk write
    #[arg(long, env = "DB_TIMEOUT", default_value_t = DEFAULT_DB_TIMEOUT_SECS)]
    pub db_timeout: u64,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_DB_MAX_CONNECTIONS)]
    pub db_max_connections: u32,

    /// Consecutive failed flushes before writes are suspended (0 disables)
    #[arg(long, env = "CIRCUIT_BREAKER_THRESHOLD", default_value_t = 0)]
    pub circuit_breaker_threshold: u32,

    /// Seconds writes stay suspended once the breaker opens
    #[arg(
        long,
        env = "CIRCUIT_BREAKER_COOLDOWN",
        default_value_t = DEFAULT_CIRCUIT_BREAKER_COOLDOWN_SECS
    )]
    pub circuit_breaker_cooldown: u64,

    /// Shortcut for --log-level debug
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Level the logger is initialised with; `--debug` wins over `--log-level`.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }

    /// API keys with surrounding whitespace and empty entries removed.
    pub fn authorized_keys(&self) -> Vec<String> {
        self.api_keys
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn relay_batch_config(&self) -> BatchConfig {
        self.batch_config(self.max_relay_batch_size, self.max_relay_batch_duration)
    }

    pub fn service_record_batch_config(&self) -> BatchConfig {
        self.batch_config(
            self.max_service_record_batch_size,
            self.max_service_record_batch_duration,
        )
    }

    fn batch_config(&self, max_size: usize, max_duration_secs: u64) -> BatchConfig {
        BatchConfig {
            max_size,
            chan_size: self.chan_size,
            max_duration: Duration::from_secs(max_duration_secs),
            write_timeout: Duration::from_secs(self.db_timeout),
            circuit_breaker: self.circuit_breaker(),
        }
    }

    fn circuit_breaker(&self) -> Option<CircuitBreakerConfig> {
        (self.circuit_breaker_threshold > 0).then(|| CircuitBreakerConfig {
            failure_threshold: self.circuit_breaker_threshold,
            cooldown: Duration::from_secs(self.circuit_breaker_cooldown),
        })
    }
}
