//! One load request, start to finish.
//!
//! open snapshot → allocate generation → parse/transform/batch-write until
//! the input ends → reap older generations → publish.

use std::time::Instant;

use log::{info, warn};

use crate::app::progress::ProgressReporter;
use crate::config::{Config, MalformedRowPolicy};
use crate::error_handling::LoadError;
use crate::models::{DatasetKind, Generation, IpFamily, LoadRequest};
use crate::snapshot::{descriptor, RowOutcome, SnapshotReader};
use crate::storage::RangeStore;

use super::batch::BatchWriter;
use super::generation::allocate_generation;
use super::reap::{retire_superseded, ReapOutcome};

/// Settings shared by every load in a run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub batch_size: usize,
    pub delimiter: u8,
    pub malformed_rows: MalformedRowPolicy,
    pub min_rows_to_reap: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            delimiter: config.delimiter,
            malformed_rows: config.malformed_rows,
            min_rows_to_reap: config.min_rows_to_reap,
        }
    }
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub kind: DatasetKind,
    pub family: IpFamily,
    pub generation: Generation,
    pub rows_written: u64,
    pub batches: u64,
    /// Line of the malformed row that ended reading early, if any
    pub truncated_at_line: Option<u64>,
    pub reap: ReapOutcome,
    pub elapsed_seconds: f64,
}

/// Loads one snapshot file into a fresh generation of its lineage.
///
/// On error, batches already committed stay in storage under the new
/// generation, and older generations are left untouched. The next load of
/// the lineage allocates past them and reaps them.
pub async fn load_snapshot<S, P>(
    store: &S,
    request: &LoadRequest,
    options: &LoadOptions,
    progress: &mut P,
) -> Result<LoadSummary, LoadError>
where
    S: RangeStore,
    P: ProgressReporter + ?Sized,
{
    let started = Instant::now();
    let LoadRequest { kind, family, .. } = *request;
    let descriptor = descriptor(kind);

    let mut reader = SnapshotReader::open(&request.path, options.delimiter)?;
    let generation = allocate_generation(store, kind, family).await?;

    info!(
        "Rebuilding {} {} as generation {} from {}",
        descriptor.table(),
        family,
        generation,
        request.path.display()
    );
    progress.begin(request, generation);

    let mut writer = BatchWriter::new(store, kind, generation, options.batch_size, progress);
    let mut truncated_at_line = None;
    loop {
        match reader.next_row()? {
            RowOutcome::Record { line, columns } => {
                let record = descriptor.transform(line, columns, family, generation)?;
                writer.append(record).await?;
            }
            RowOutcome::MalformedRow { line, reason } => match options.malformed_rows {
                MalformedRowPolicy::Truncate => {
                    warn!(
                        "{}: malformed row at line {} ({}); ignoring the rest of the file",
                        request.path.display(),
                        line,
                        reason
                    );
                    truncated_at_line = Some(line);
                    break;
                }
                MalformedRowPolicy::Strict => {
                    return Err(LoadError::MalformedRow { line, reason });
                }
            },
            RowOutcome::EndOfInput => break,
        }
    }
    let totals = writer.finish().await?;

    let reap = retire_superseded(
        store,
        kind,
        family,
        generation,
        totals.rows,
        options.min_rows_to_reap,
    )
    .await?;

    let summary = LoadSummary {
        kind,
        family,
        generation,
        rows_written: totals.rows,
        batches: totals.batches,
        truncated_at_line,
        reap,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };
    progress.finish(&summary);
    Ok(summary)
}
