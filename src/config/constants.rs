//! Configuration constants.
//!
//! This module defines the defaults and limits used by the loader.

/// Default SQLite database path
pub const DB_PATH: &str = "./ip_ranges.db";

/// Rows buffered before a batch is committed.
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Upper bound for `--batch-size`.
/// Each batch is one write transaction; larger batches hold the SQLite write
/// lock longer and delay readers of the WAL checkpoint.
pub const MAX_BATCH_SIZE: usize = 100_000;

/// Minimum rows a new generation must hold before older generations are deleted.
/// A value of 0 reaps unconditionally, even after an empty snapshot.
pub const DEFAULT_MIN_ROWS_TO_REAP: u64 = 1;

/// Field delimiter of snapshot files
pub const DEFAULT_DELIMITER: u8 = b',';

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "IP_RANGES_DB_PATH";
