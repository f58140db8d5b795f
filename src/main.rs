//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `transaction_http_db` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use transaction_http_db::initialization::init_logger_with;
use transaction_http_db::{run_server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; options may come from flags or the real environment
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    init_logger_with(config.effective_log_level().into(), config.log_format)
        .context("Failed to initialize logger")?;

    if let Err(e) = run_server(config).await {
        log::error!("transaction_http_db error: {:#}", e);
        eprintln!("transaction_http_db error: {:#}", e);
        process::exit(1);
    }

    Ok(())
}
