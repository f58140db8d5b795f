//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled for concurrent access
//! - A bounded number of connections
//! - Automatic database file creation

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initializes and returns a database connection pool.
///
/// `connection_string` is either a sqlx SQLite URL (`sqlite://txdb.db`,
/// `sqlite::memory:`) or a plain file path. A plain path is created if it
/// does not exist yet.
pub async fn init_db_pool(
    connection_string: &str,
    max_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    let options = if connection_string.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(connection_string)
            .map_err(|e| {
                error!("Invalid connection string: {e}");
                DatabaseError::SqlError(e)
            })?
            .create_if_missing(true)
    } else {
        create_db_file(Path::new(connection_string))?;
        SqliteConnectOptions::new().filename(connection_string)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options.busy_timeout(BUSY_TIMEOUT))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    // Enable WAL mode
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(pool)
}

fn create_db_file(db_path: &Path) -> Result<(), DatabaseError> {
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => info!("Database file created successfully."),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Database file already exists.")
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }
    Ok(())
}
