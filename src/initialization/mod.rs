//! Application initialization.
//!
//! This module sets up process-wide resources before any load runs:
//! - Environment from `.env`
//! - Logger (plain or JSON output)
//!
//! The database pool lives in `storage::pool`.

mod env;
mod logger;

// Re-export public API
pub use env::load_env_file;
pub use logger::init_logger_with;
