//! SQLite-backed driver shared by the batches and the HTTP handlers.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::time::Instant;

use crate::batch::RecordWriter;
use crate::error_handling::BoxError;
use crate::types::{Relay, ServiceRecord};

/// Owns the connection pool; cheap to clone.
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    pub(crate) pool: SqlitePool,
}

impl SqliteDriver {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteDriver { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordWriter<Relay> for SqliteDriver {
    async fn write(&self, _deadline: Instant, items: Vec<Relay>) -> Result<(), BoxError> {
        self.write_relays(&items).await.map_err(Into::into)
    }
}

#[async_trait]
impl RecordWriter<ServiceRecord> for SqliteDriver {
    async fn write(&self, _deadline: Instant, items: Vec<ServiceRecord>) -> Result<(), BoxError> {
        self.write_service_records(&items).await.map_err(Into::into)
    }
}

/// Maps empty strings to NULL for optional text columns.
pub(super) fn text(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}
