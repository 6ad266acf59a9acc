//! Fixed-size batching of transformed records.

use log::debug;

use crate::app::progress::ProgressReporter;
use crate::error_handling::LoadError;
use crate::models::{DatasetKind, Generation, IpRangeRecord};
use crate::storage::RangeStore;

/// Rows and commits produced by one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchTotals {
    pub rows: u64,
    pub batches: u64,
}

/// Buffers records of one generation and commits them in batches.
///
/// Lives for a single load request. Each commit is all-or-nothing; commits
/// that already succeeded are never rolled back.
pub struct BatchWriter<'a, S, P: ?Sized> {
    store: &'a S,
    kind: DatasetKind,
    generation: Generation,
    batch_size: usize,
    buffer: Vec<IpRangeRecord>,
    totals: BatchTotals,
    progress: &'a mut P,
}

impl<'a, S: RangeStore, P: ProgressReporter + ?Sized> BatchWriter<'a, S, P> {
    pub fn new(
        store: &'a S,
        kind: DatasetKind,
        generation: Generation,
        batch_size: usize,
        progress: &'a mut P,
    ) -> Self {
        let batch_size = batch_size.max(1);
        BatchWriter {
            store,
            kind,
            generation,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            totals: BatchTotals::default(),
            progress,
        }
    }

    /// Adds a record to the buffer and commits the buffer once it is full.
    pub async fn append(&mut self, record: IpRangeRecord) -> Result<(), LoadError> {
        self.buffer.push(record);

        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }

        Ok(())
    }

    /// Commits buffered records, reports the running total, then clears the buffer.
    pub async fn flush(&mut self) -> Result<(), LoadError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let count = self.buffer.len() as u64;
        debug!(
            "Flushing batch of {} {} records (generation {})",
            count, self.kind, self.generation
        );

        self.store
            .save_batch(self.kind, &self.buffer)
            .await
            .map_err(|source| LoadError::Write {
                kind: self.kind,
                generation: self.generation,
                committed: self.totals.rows,
                source,
            })?;

        self.totals.rows += count;
        self.totals.batches += 1;
        self.progress.saved(self.totals.rows);
        self.buffer.clear();
        Ok(())
    }

    /// Commits whatever is left and returns the totals for the load.
    pub async fn finish(mut self) -> Result<BatchTotals, LoadError> {
        self.flush().await?;
        Ok(self.totals)
    }
}
