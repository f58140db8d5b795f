//! Schema migrations, embedded into the binary at build time.

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration from `migrations/`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to apply database migrations")?;
    log::debug!("Applied {} database migrations", MIGRATOR.iter().count());
    Ok(())
}
