//! ip_ranges library: versioned reloads of IP range reference tables
//!
//! The loader keeps three datasets (country, ASN, city), each split into an
//! IPv4 and an IPv6 lineage. Every reload of a lineage writes a fresh
//! generation in batches, deletes the generations it supersedes, and then
//! publishes itself in `dataset_generations`. Lookup services should filter
//! on the published generation: rows of a load in progress are visible as
//! soon as their batch commits.
//!
//! # Example
//!
//! ```no_run
//! use ip_ranges::{run_reload, Config, DatasetKind, IpFamily, LoadRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     requests: vec![
//!         LoadRequest::new(DatasetKind::Country, IpFamily::V4, "country_v4.csv"),
//!         LoadRequest::new(DatasetKind::Country, IpFamily::V6, "country_v6.csv"),
//!     ],
//!     ..Default::default()
//! };
//!
//! let report = run_reload(config).await?;
//! println!("{} rows written", report.total_rows());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod error_handling;
pub mod initialization;
pub mod load;
pub mod models;
pub mod snapshot;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, MalformedRowPolicy, ProgressMode};
pub use error_handling::{DatabaseError, LoadError};
pub use load::{run_loads, LoadOptions, LoadSummary, ReapOutcome, RunOptions, RunReport};
pub use models::{DatasetKind, Generation, IpFamily, IpRangeRecord, LoadRequest};
pub use run::{check_datasets, run_reload};
pub use storage::{init_db_pool_with_path, run_migrations, RangeStore, SqliteRangeStore};

// Entry points used by the binary
mod run {
    use anyhow::{Context, Result};
    use log::{info, warn};
    use strum::IntoEnumIterator;

    use crate::app::{log_run_report, reporter_for};
    use crate::config::Config;
    use crate::load::{missing_datasets, run_loads, RunOptions, RunReport};
    use crate::models::DatasetKind;
    use crate::storage::{init_db_pool_with_path, run_migrations, SqliteRangeStore};

    async fn open_store(config: &Config) -> Result<SqliteRangeStore> {
        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(SqliteRangeStore::new(pool))
    }

    /// Distinct kinds named by the requests, in first-seen order.
    fn requested_kinds(config: &Config) -> Vec<DatasetKind> {
        let mut kinds = Vec::new();
        for request in &config.requests {
            if !kinds.contains(&request.kind) {
                kinds.push(request.kind);
            }
        }
        kinds
    }

    /// Loads every request in `config`, in order.
    ///
    /// Per-request failures are part of the returned report; only problems
    /// before the first load (invalid config, database unavailable) are
    /// returned as errors.
    pub async fn run_reload(config: Config) -> Result<RunReport> {
        config.validate()?;
        let store = open_store(&config).await?;

        info!("Loading {} datasets", config.requests.len());
        let mut progress = reporter_for(config.progress);
        let report = run_loads(
            &store,
            &config.requests,
            &RunOptions::from(&config),
            &mut progress,
        )
        .await;
        log_run_report(&report);

        for kind in missing_datasets(&store, &requested_kinds(&config))
            .await
            .context("Failed to check dataset readiness")?
        {
            warn!("{kind} dataset has no completed load; lookups against it will find nothing");
        }

        Ok(report)
    }

    /// Returns the datasets that have never completed a load.
    ///
    /// Checks the kinds named in `config.requests`, or every kind when the
    /// config has no requests.
    pub async fn check_datasets(config: &Config) -> Result<Vec<DatasetKind>> {
        config.validate()?;
        let store = open_store(config).await?;

        let mut kinds = requested_kinds(config);
        if kinds.is_empty() {
            kinds = DatasetKind::iter().collect();
        }

        Ok(missing_datasets(&store, &kinds).await?)
    }
}
