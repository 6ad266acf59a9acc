//! Shared helpers for integration tests.

use std::io::Write;

use ip_ranges::app::ProgressReporter;
use ip_ranges::{run_migrations, LoadRequest, LoadSummary, RangeStore};
use ip_ranges::{DatabaseError, DatasetKind, Generation, IpFamily, IpRangeRecord};
use ip_ranges::models::PublishedGeneration;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Creates an in-memory database pool with migrations applied.
#[allow(dead_code)] // Used by other test files
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

/// Writes `contents` to a temporary snapshot file.
#[allow(dead_code)] // Used by other test files
pub fn snapshot_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp snapshot");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp snapshot");
    file
}

/// Country snapshot with `rows` distinct ranges.
#[allow(dead_code)] // Used by other test files
pub fn country_rows(rows: usize) -> String {
    (0..rows)
        .map(|i| format!("10.{}.{}.0,10.{}.{}.255,C{}\n", i / 256, i % 256, i / 256, i % 256, i % 10))
        .collect()
}

/// Store wrapper that records the size of every committed batch.
#[allow(dead_code)] // Used by other test files
pub struct RecordingStore<S> {
    pub inner: S,
    pub batch_sizes: Mutex<Vec<usize>>,
}

#[allow(dead_code)] // Used by other test files
impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().expect("batch size lock").clone()
    }
}

impl<S: RangeStore> RangeStore for RecordingStore<S> {
    async fn max_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
    ) -> Result<Option<Generation>, DatabaseError> {
        self.inner.max_generation(kind, family).await
    }

    async fn save_batch(
        &self,
        kind: DatasetKind,
        records: &[IpRangeRecord],
    ) -> Result<(), DatabaseError> {
        self.inner.save_batch(kind, records).await?;
        self.batch_sizes
            .lock()
            .expect("batch size lock")
            .push(records.len());
        Ok(())
    }

    async fn delete_generations_below(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
    ) -> Result<u64, DatabaseError> {
        self.inner
            .delete_generations_below(kind, family, generation)
            .await
    }

    async fn publish_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        row_count: u64,
    ) -> Result<(), DatabaseError> {
        self.inner
            .publish_generation(kind, family, generation, row_count)
            .await
    }

    async fn retire_and_publish(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        row_count: u64,
    ) -> Result<u64, DatabaseError> {
        self.inner
            .retire_and_publish(kind, family, generation, row_count)
            .await
    }

    async fn published_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
    ) -> Result<Option<PublishedGeneration>, DatabaseError> {
        self.inner.published_generation(kind, family).await
    }

    async fn count_rows(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Option<Generation>,
    ) -> Result<u64, DatabaseError> {
        self.inner.count_rows(kind, family, generation).await
    }
}

/// Progress reporter that keeps every event for later assertions.
#[allow(dead_code)] // Used by other test files
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub begun: Vec<(LoadRequest, Generation)>,
    pub saved: Vec<u64>,
    pub finished: usize,
}

impl ProgressReporter for RecordingProgress {
    fn begin(&mut self, request: &LoadRequest, generation: Generation) {
        self.begun.push((request.clone(), generation));
    }

    fn saved(&mut self, cumulative: u64) {
        self.saved.push(cumulative);
    }

    fn finish(&mut self, _summary: &LoadSummary) {
        self.finished += 1;
    }
}
