//! Error handling.
//!
//! Error types are grouped by the layer that raises them:
//! - **Validation**: a record rejected before it enters a batch
//! - **Batch**: producer-side (`Closed`) and flush-time failures
//! - **Config**: invalid batch configuration
//! - **Database**: storage layer failures
//! - **Initialization**: logger setup

mod types;

// Re-export public API
pub use types::{
    BatchError, BoxError, ConfigError, DatabaseError, InitializationError, ValidationError,
};
