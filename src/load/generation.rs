//! Generation allocation.

use crate::error_handling::LoadError;
use crate::models::{DatasetKind, Generation, IpFamily};
use crate::storage::RangeStore;

/// Returns the generation the next load of (kind, family) must write.
///
/// One above the highest generation seen in either the stored rows or the
/// published marker, so a number is never reused after an empty load was
/// reaped away. Starts at [`Generation::FIRST`].
///
/// Assumes a single writer per lineage; two loads allocating concurrently
/// would get the same number. Fails rather than reuse the last number.
pub async fn allocate_generation<S: RangeStore>(
    store: &S,
    kind: DatasetKind,
    family: IpFamily,
) -> Result<Generation, LoadError> {
    let allocate_err = |source| LoadError::Allocate {
        kind,
        family,
        source,
    };
    let stored = store
        .max_generation(kind, family)
        .await
        .map_err(allocate_err)?;
    let published = store
        .published_generation(kind, family)
        .await
        .map_err(allocate_err)?
        .map(|p| p.generation);

    match stored.max(published) {
        Some(current) => current
            .next()
            .ok_or(LoadError::GenerationsExhausted {
                kind,
                family,
                last: current,
            }),
        None => Ok(Generation::FIRST),
    }
}
