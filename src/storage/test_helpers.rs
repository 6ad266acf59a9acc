//! Shared test helpers for storage and loader tests.
//!
//! This module provides database setup and record builders used across the
//! crate's unit tests.

#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::models::{CountryRecord, Generation, IpFamily, IpRangeRecord, RangeKey};
#[cfg(test)]
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database; a single connection keeps every query on the
/// same database.
#[cfg(test)]
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

/// Builds a country record for storage tests.
#[cfg(test)]
pub fn country_record(
    start: &str,
    end: &str,
    country_code: &str,
    family: IpFamily,
    generation: u32,
) -> IpRangeRecord {
    IpRangeRecord::Country(CountryRecord {
        range: RangeKey {
            start: start.to_string(),
            end: end.to_string(),
            family,
            generation: Generation::new(generation),
        },
        country_code: country_code.to_string(),
    })
}
