// storage/mod.rs
// Database operations module

pub mod migrations;
pub mod pool;
pub mod sqlite;
pub mod store;
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteRangeStore;
pub use store::RangeStore;
