//! Shared test helpers for storage module tests.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::storage::{run_migrations, SqliteDriver};

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub async fn create_test_driver() -> SqliteDriver {
    SqliteDriver::new(create_test_pool().await)
}
