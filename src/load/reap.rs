//! Retiring superseded generations.

use log::{info, warn};

use crate::error_handling::{DatabaseError, LoadError};
use crate::models::{DatasetKind, Generation, IpFamily};
use crate::storage::RangeStore;

/// What happened to older generations after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// Older rows were deleted and the new generation published.
    Reaped { deleted: u64 },
    /// The new generation was too small; older rows were left in place and
    /// nothing was published.
    Skipped { rows: u64, threshold: u64 },
}

/// Deletes every row of (kind, family) older than `generation`.
///
/// Rows at `generation` itself are never touched, even when there are none.
pub async fn reap<S: RangeStore>(
    store: &S,
    kind: DatasetKind,
    family: IpFamily,
    generation: Generation,
) -> Result<u64, DatabaseError> {
    store
        .delete_generations_below(kind, family, generation)
        .await
}

/// Reaps older generations and publishes `generation` as complete.
///
/// Both happen in one storage transaction, so the published marker never
/// names a generation whose rows are gone. When the load wrote fewer than
/// `min_rows` rows, nothing is deleted and nothing is published, so readers
/// keep the previous generation. A `min_rows` of 0 always reaps.
pub async fn retire_superseded<S: RangeStore>(
    store: &S,
    kind: DatasetKind,
    family: IpFamily,
    generation: Generation,
    rows: u64,
    min_rows: u64,
) -> Result<ReapOutcome, LoadError> {
    if rows < min_rows {
        warn!(
            "Keeping previous {} {} data: generation {} has {} rows, {} required before reaping",
            kind, family, generation, rows, min_rows
        );
        return Ok(ReapOutcome::Skipped {
            rows,
            threshold: min_rows,
        });
    }

    let deleted = store
        .retire_and_publish(kind, family, generation, rows)
        .await
        .map_err(|source| LoadError::Reap {
            kind,
            family,
            generation,
            source,
        })?;

    info!(
        "Published {} {} generation {} ({} rows, {} superseded rows deleted)",
        kind, family, generation, rows, deleted
    );
    Ok(ReapOutcome::Reaped { deleted })
}
