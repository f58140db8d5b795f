//! Application configuration and constants.
//!
//! This module provides:
//! - Default values for every option
//! - CLI/environment option parsing

mod constants;
mod types;

pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
