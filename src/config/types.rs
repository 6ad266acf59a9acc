//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DB_PATH, DB_PATH_ENV, DEFAULT_BATCH_SIZE, DEFAULT_DELIMITER, DEFAULT_MIN_ROWS_TO_REAP,
    MAX_BATCH_SIZE,
};
use crate::error_handling::ConfigValidationError;
use crate::models::LoadRequest;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// What to do when a snapshot row cannot be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MalformedRowPolicy {
    /// Stop reading the file and keep the rows before it. The line is
    /// reported in the load summary.
    Truncate,
    /// Fail the load request.
    Strict,
}

/// Where per-batch progress goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProgressMode {
    /// Rewrite a single "Saved: N entries" console line
    Console,
    /// Log each flush at info level
    Log,
    /// No progress output
    None,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use ip_ranges::{Config, DatasetKind, IpFamily, LoadRequest};
///
/// let config = Config {
///     requests: vec![LoadRequest::new(DatasetKind::Country, IpFamily::V4, "country4.csv")],
///     batch_size: 500,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot files to load, in order
    pub requests: Vec<LoadRequest>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Rows per committed batch
    pub batch_size: usize,

    /// Snapshot field delimiter
    pub delimiter: u8,

    /// Handling of undecodable rows
    pub malformed_rows: MalformedRowPolicy,

    /// Rows a new generation needs before older generations are deleted
    pub min_rows_to_reap: u64,

    /// Stop the run at the first failed request
    pub stop_on_error: bool,

    /// Progress output
    pub progress: ProgressMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: DEFAULT_DELIMITER,
            malformed_rows: MalformedRowPolicy::Truncate,
            min_rows_to_reap: DEFAULT_MIN_ROWS_TO_REAP,
            stop_on_error: false,
            progress: ProgressMode::Console,
        }
    }
}

impl Config {
    /// Checks value ranges. Does not touch the filesystem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.batch_size == 0 {
            return Err(ConfigValidationError::new(
                "batch_size",
                "must be greater than 0",
            ));
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigValidationError::new(
                "batch_size",
                format!("must be at most {MAX_BATCH_SIZE}"),
            ));
        }
        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(ConfigValidationError::new(
                "delimiter",
                "cannot be a quote or line break",
            ));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::new("db_path", "must not be empty"));
        }
        Ok(())
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Reload IPv4 and IPv6 country tables
/// ip_ranges --dataset country:4:./country_v4.csv --dataset country:6:./country_v6.csv
///
/// # Load everything listed in a manifest, failing hard on bad rows
/// ip_ranges --manifest datasets.json --malformed-rows strict
///
/// # Report which datasets were never loaded
/// ip_ranges --check
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "ip_ranges",
    about = "Reloads versioned IP range tables (country, ASN, city) from CSV snapshots."
)]
pub struct Opt {
    /// Dataset to load as KIND:FAMILY:PATH (e.g. city:6:./city_v6.csv). Repeatable.
    #[arg(long = "dataset", value_name = "KIND:FAMILY:PATH")]
    pub datasets: Vec<String>,

    /// JSON manifest: an array of {"kind", "family", "path"} objects, loaded
    /// after any --dataset entries
    #[arg(long, value_parser)]
    pub manifest: Option<PathBuf>,

    /// Only report datasets that have never been loaded, then exit
    #[arg(long)]
    pub check: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, value_parser, env = DB_PATH_ENV, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Rows per committed batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Snapshot field delimiter (single ASCII character)
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Handling of undecodable rows: truncate|strict
    #[arg(long, value_enum, default_value_t = MalformedRowPolicy::Truncate)]
    pub malformed_rows: MalformedRowPolicy,

    /// Rows a new generation needs before older generations are deleted.
    /// 0 always deletes, even when the snapshot was empty.
    #[arg(long, default_value_t = DEFAULT_MIN_ROWS_TO_REAP)]
    pub min_rows_to_reap: u64,

    /// Stop at the first failed dataset instead of continuing with the rest
    #[arg(long)]
    pub stop_on_error: bool,

    /// Progress output: console|log|none
    #[arg(long, value_enum, default_value_t = ProgressMode::Console)]
    pub progress: ProgressMode,
}
