//! The versioned reload pipeline.
//!
//! Each request writes a new generation of one (dataset, family) lineage in
//! batches, then deletes the generations it supersedes and publishes itself.
//! Requests run strictly one after another.

mod batch;
mod generation;
mod orchestrator;
mod pipeline;
mod reap;
mod readiness;

pub use batch::{BatchTotals, BatchWriter};
pub use generation::allocate_generation;
pub use orchestrator::{run_loads, RequestOutcome, RunOptions, RunReport};
pub use pipeline::{load_snapshot, LoadOptions, LoadSummary};
pub use reap::{reap, retire_superseded, ReapOutcome};
pub use readiness::missing_datasets;
