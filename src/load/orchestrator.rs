//! Runs a list of load requests in order.

use std::time::Instant;

use log::{error, info};

use crate::app::progress::ProgressReporter;
use crate::config::Config;
use crate::error_handling::LoadError;
use crate::models::LoadRequest;
use crate::storage::RangeStore;

use super::pipeline::{load_snapshot, LoadOptions, LoadSummary};

/// Settings for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub load: LoadOptions,
    /// Stop after the first failed request
    pub stop_on_error: bool,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            load: LoadOptions::from(config),
            stop_on_error: config.stop_on_error,
        }
    }
}

/// What happened to one request.
#[derive(Debug)]
pub struct RequestOutcome {
    pub request: LoadRequest,
    pub result: Result<LoadSummary, LoadError>,
}

/// Outcomes of a run, in request order.
///
/// Requests skipped after a failure under `stop_on_error` have no outcome.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<RequestOutcome>,
    /// Number of requests handed to the run
    pub requested: usize,
    pub elapsed_seconds: f64,
}

impl RunReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&LoadRequest, &LoadSummary)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| (&o.request, s)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&LoadRequest, &LoadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.request, e)))
    }

    pub fn not_attempted(&self) -> usize {
        self.requested - self.outcomes.len()
    }

    /// True when every request was attempted and none failed.
    pub fn is_success(&self) -> bool {
        self.not_attempted() == 0 && self.failed().next().is_none()
    }

    pub fn total_rows(&self) -> u64 {
        self.succeeded().map(|(_, s)| s.rows_written).sum()
    }
}

/// Loads `requests` one after another.
///
/// A failed request is recorded and the run moves on to the next one,
/// unless `stop_on_error` is set.
pub async fn run_loads<S, P>(
    store: &S,
    requests: &[LoadRequest],
    options: &RunOptions,
    progress: &mut P,
) -> RunReport
where
    S: RangeStore,
    P: ProgressReporter + ?Sized,
{
    let started = Instant::now();
    let mut outcomes = Vec::with_capacity(requests.len());

    for (index, request) in requests.iter().enumerate() {
        let result = load_snapshot(store, request, &options.load, progress).await;
        let failed = result.is_err();
        if let Err(e) = &result {
            error!("Load of {request} failed: {e}");
        }
        outcomes.push(RequestOutcome {
            request: request.clone(),
            result,
        });

        if failed && options.stop_on_error {
            info!(
                "Stopping after failed request; {} remaining requests skipped",
                requests.len() - index - 1
            );
            break;
        }
    }

    RunReport {
        outcomes,
        requested: requests.len(),
        elapsed_seconds: started.elapsed().as_secs_f64(),
    }
}
