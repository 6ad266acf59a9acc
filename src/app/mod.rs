//! Application-facing helpers around the load pipeline.
//!
//! This module provides progress reporting during loads and the end-of-run
//! summary.

pub mod progress;
pub mod statistics;

// Re-export public API
pub use progress::{reporter_for, ProgressReporter};
pub use statistics::log_run_report;
