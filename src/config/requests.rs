//! Building the ordered list of load requests from CLI input.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::types::{Config, Opt};
use crate::error_handling::ConfigValidationError;
use crate::models::{DatasetKind, IpFamily, LoadRequest};

/// Parses a `KIND:FAMILY:PATH` dataset argument.
///
/// The path is everything after the second colon, so it may itself contain colons.
pub fn parse_dataset_arg(arg: &str) -> Result<LoadRequest, ConfigValidationError> {
    let mut parts = arg.splitn(3, ':');
    let (Some(kind), Some(family), Some(path)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ConfigValidationError::new(
            "dataset",
            format!("'{arg}' is not in KIND:FAMILY:PATH form"),
        ));
    };

    let kind: DatasetKind = kind.trim().parse().map_err(|_| {
        ConfigValidationError::new(
            "dataset",
            format!("unknown dataset kind '{kind}' (expected country, asn or city)"),
        )
    })?;
    let family: IpFamily = family
        .parse()
        .map_err(|e: String| ConfigValidationError::new("dataset", e))?;
    if path.trim().is_empty() {
        return Err(ConfigValidationError::new(
            "dataset",
            format!("'{arg}' has an empty path"),
        ));
    }

    Ok(LoadRequest::new(kind, family, path))
}

/// Reads a JSON manifest: an array of `{"kind", "family", "path"}` objects.
pub fn load_manifest(path: &Path) -> Result<Vec<LoadRequest>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let requests: Vec<LoadRequest> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    Ok(requests)
}

impl Config {
    /// Builds the library configuration from parsed CLI options.
    ///
    /// `--dataset` entries come first in the order given, then manifest entries.
    pub fn from_opt(opt: Opt) -> Result<Config> {
        let mut requests = opt
            .datasets
            .iter()
            .map(|arg| parse_dataset_arg(arg))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(manifest) = &opt.manifest {
            requests.extend(load_manifest(manifest)?);
        }

        if !opt.delimiter.is_ascii() {
            return Err(ConfigValidationError::new(
                "delimiter",
                format!("'{}' is not a single ASCII character", opt.delimiter),
            )
            .into());
        }

        let config = Config {
            requests,
            log_level: opt.log_level,
            log_format: opt.log_format,
            db_path: opt.db_path,
            batch_size: opt.batch_size,
            delimiter: opt.delimiter as u8,
            malformed_rows: opt.malformed_rows,
            min_rows_to_reap: opt.min_rows_to_reap,
            stop_on_error: opt.stop_on_error,
            progress: opt.progress,
        };
        config.validate()?;
        Ok(config)
    }
}
