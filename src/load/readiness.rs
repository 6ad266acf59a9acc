//! Which datasets have never finished a load.

use strum::IntoEnumIterator;

use crate::error_handling::DatabaseError;
use crate::models::{DatasetKind, IpFamily};
use crate::storage::RangeStore;

/// Returns the kinds in `kinds` with no published generation in any family.
///
/// A dataset counts as initialised once one of its families has completed a
/// load; lookups for the other family simply find nothing.
pub async fn missing_datasets<S: RangeStore>(
    store: &S,
    kinds: &[DatasetKind],
) -> Result<Vec<DatasetKind>, DatabaseError> {
    let mut missing = Vec::new();
    for &kind in kinds {
        let mut initialised = false;
        for family in IpFamily::iter() {
            if store.published_generation(kind, family).await?.is_some() {
                initialised = true;
                break;
            }
        }
        if !initialised {
            missing.push(kind);
        }
    }
    Ok(missing)
}
