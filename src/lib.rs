//! transaction_http_db library: batched persistence for relay telemetry
//!
//! Records arrive over HTTP, are validated, and accumulate in a [`Batch`]
//! per record type. A batch flushes to the database when it reaches its size
//! limit or when its interval elapses, whichever comes first, and drains
//! everything it has accepted when the service shuts down.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use transaction_http_db::{init_db_pool, run_migrations, Batch, BatchConfig};
//! use transaction_http_db::{BatchMetrics, Relay, SqliteDriver};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = init_db_pool("sqlite://txdb.db", 10).await?;
//! run_migrations(&pool).await?;
//!
//! let batch = Batch::<Relay>::new(
//!     "relay",
//!     BatchConfig::default(),
//!     Arc::new(SqliteDriver::new(pool)),
//!     Arc::new(BatchMetrics::new()),
//! )?;
//! batch.add(Relay::default()).await.ok();
//! batch.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! A Tokio runtime must be running when a batch is created.

pub mod app;
pub mod batch;
pub mod config;
mod error_handling;
pub mod initialization;
pub mod metrics;
pub mod server;
mod storage;
pub mod types;

// Re-export public API
pub use app::{build_state, run_server, run_until};
pub use batch::{Batch, BatchConfig, CircuitBreakerConfig, RecordWriter, Validate};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::{
    BatchError, BoxError, ConfigError, DatabaseError, InitializationError, ValidationError,
};
pub use metrics::{BatchMetrics, MetricType};
pub use storage::{init_db_pool, run_migrations, SqliteDriver};
pub use types::{ErrorSource, PocketSession, PortalRegion, Relay, ServiceRecord};
