//! Error type definitions.
//!
//! This module defines the error types used throughout the loader.

use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

use crate::models::{DatasetKind, Generation, IpFamily};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A batch handed to storage contained a record of another dataset.
    #[error("Batch for {expected} contains a {found} record")]
    KindMismatch {
        expected: DatasetKind,
        found: DatasetKind,
    },
}

/// Reasons a single load request fails.
///
/// Every variant is scoped to one request: the orchestrator records it and
/// moves on to the next request unless asked to stop.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The snapshot file could not be opened.
    #[error("Failed to open snapshot {path}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the snapshot failed part way (not a malformed row).
    #[error("Failed to read snapshot {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row has fewer columns than its dataset requires.
    #[error("Line {line}: expected at least {expected} columns, found {found}")]
    ShortRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// A row could not be decoded. Only raised under the strict policy.
    #[error("Line {line}: malformed row: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// The next generation could not be determined.
    #[error("Failed to allocate generation for {kind} {family}: {source}")]
    Allocate {
        kind: DatasetKind,
        family: IpFamily,
        #[source]
        source: DatabaseError,
    },

    /// The lineage already used the highest generation number.
    #[error("No generation left for {kind} {family} after {last}")]
    GenerationsExhausted {
        kind: DatasetKind,
        family: IpFamily,
        last: Generation,
    },

    /// A batch commit failed. Earlier batches stay committed.
    #[error("Failed to write batch for {kind} generation {generation} after {committed} rows: {source}")]
    Write {
        kind: DatasetKind,
        generation: Generation,
        committed: u64,
        #[source]
        source: DatabaseError,
    },

    /// Deleting superseded generations or publishing the new one failed.
    /// Both roll back together, so the previous generation stays published.
    #[error("Failed to reap {kind} {family} below generation {generation}: {source}")]
    Reap {
        kind: DatasetKind,
        family: IpFamily,
        generation: Generation,
        #[source]
        source: DatabaseError,
    },
}

/// Configuration validation failure, naming the offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid configuration for '{field}': {message}")]
pub struct ConfigValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ConfigValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
