//! Snapshot files: reading delimited rows and turning them into typed records.

mod parser;
mod transform;

pub use parser::{RowOutcome, SnapshotReader};
pub use transform::{descriptor, DatasetDescriptor};
