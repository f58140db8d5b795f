// storage/mod.rs
// Database operations module

mod driver;
pub mod migrations;
pub mod pool;
mod relay;
mod service_record;
mod session;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use driver::SqliteDriver;
pub use migrations::run_migrations;
pub use pool::init_db_pool;
