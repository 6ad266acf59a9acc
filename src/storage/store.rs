//! Storage contract the load pipeline depends on.

use crate::error_handling::DatabaseError;
use crate::models::{DatasetKind, Generation, IpFamily, IpRangeRecord, PublishedGeneration};

/// Persistence operations needed to reload one (dataset, family) lineage.
///
/// Implementations must make `save_batch` all-or-nothing. Nothing else is
/// assumed: the loader is the single writer of a lineage, and readers may
/// see rows of a generation while it is still being written.
#[allow(async_fn_in_trait)] // Used through generics only; futures are never sent across tasks
pub trait RangeStore {
    /// Highest generation with at least one stored row, if any.
    async fn max_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
    ) -> Result<Option<Generation>, DatabaseError>;

    /// Commits `records` as one unit. Every record must be of `kind`.
    async fn save_batch(
        &self,
        kind: DatasetKind,
        records: &[IpRangeRecord],
    ) -> Result<(), DatabaseError>;

    /// Deletes rows of the lineage with a generation strictly below
    /// `generation`. Returns the number of deleted rows.
    async fn delete_generations_below(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
    ) -> Result<u64, DatabaseError>;

    /// Records `generation` as the lineage's last completed load.
    async fn publish_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        row_count: u64,
    ) -> Result<(), DatabaseError>;

    /// Deletes rows below `generation` and records `generation` as published,
    /// both or neither. Returns the number of deleted rows.
    async fn retire_and_publish(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        row_count: u64,
    ) -> Result<u64, DatabaseError>;

    /// Last completed load of the lineage, if it was ever published.
    async fn published_generation(
        &self,
        kind: DatasetKind,
        family: IpFamily,
    ) -> Result<Option<PublishedGeneration>, DatabaseError>;

    /// Counts stored rows of the lineage, optionally only those of one generation.
    async fn count_rows(
        &self,
        kind: DatasetKind,
        family: IpFamily,
        generation: Option<Generation>,
    ) -> Result<u64, DatabaseError>;
}
