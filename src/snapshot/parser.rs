//! Delimited snapshot reader.
//!
//! Rows come back as a tagged outcome so the caller can tell a clean end of
//! file from a row that could not be decoded.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ErrorKind, ReaderBuilder, StringRecord};

use crate::error_handling::LoadError;

/// Result of reading one row.
#[derive(Debug, PartialEq)]
pub enum RowOutcome<'a> {
    /// A decoded row. `line` is 1-based.
    Record {
        line: u64,
        columns: &'a StringRecord,
    },
    /// The row at `line` could not be decoded. Reading stops here.
    MalformedRow { line: u64, reason: String },
    /// No more rows.
    EndOfInput,
}

/// Forward-only reader over one snapshot file.
///
/// No header is skipped. Every row must have as many fields as the first
/// row; a row that differs is reported as malformed. Once a malformed row or
/// the end of input is seen, every later call returns `EndOfInput`.
pub struct SnapshotReader<R = File> {
    path: PathBuf,
    reader: csv::Reader<R>,
    record: StringRecord,
    finished: bool,
}

impl SnapshotReader<File> {
    /// Opens `path` for reading.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(path, file, delimiter))
    }
}

impl<R: Read> SnapshotReader<R> {
    /// Wraps an already open byte stream. `path` is only used in errors.
    pub fn from_reader(path: &Path, source: R, delimiter: u8) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .delimiter(delimiter)
            .from_reader(source);
        Self {
            path: path.to_path_buf(),
            reader,
            record: StringRecord::new(),
            finished: false,
        }
    }

    /// Reads the next row.
    ///
    /// I/O failures are returned as `LoadError::SourceRead`; decoding
    /// problems come back as `RowOutcome::MalformedRow`.
    pub fn next_row(&mut self) -> Result<RowOutcome<'_>, LoadError> {
        if self.finished {
            return Ok(RowOutcome::EndOfInput);
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let line = self.record.position().map_or(0, |p| p.line());
                Ok(RowOutcome::Record {
                    line,
                    columns: &self.record,
                })
            }
            Ok(false) => {
                self.finished = true;
                Ok(RowOutcome::EndOfInput)
            }
            Err(err) => {
                self.finished = true;
                if matches!(err.kind(), ErrorKind::Io(_)) {
                    return Err(LoadError::SourceRead {
                        path: self.path.clone(),
                        source: err,
                    });
                }
                let line = err
                    .position()
                    .map_or_else(|| self.reader.position().line(), |p| p.line());
                Ok(RowOutcome::MalformedRow {
                    line,
                    reason: err.to_string(),
                })
            }
        }
    }
}
