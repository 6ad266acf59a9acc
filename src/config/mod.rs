//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (batch size, reap threshold, etc.)
//! - CLI option types and parsing
//! - Load request construction from `--dataset` flags and manifests

mod constants;
mod requests;
mod types;

// Re-export all constants
pub use constants::*;
pub use requests::{load_manifest, parse_dataset_arg};
pub use types::{Config, LogFormat, LogLevel, MalformedRowPolicy, Opt, ProgressMode};
