//! End-of-run summary logging.

use log::{error, info, warn};

use crate::load::{ReapOutcome, RunReport};

/// Logs one line per request and a final tally.
pub fn log_run_report(report: &RunReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(summary) => {
                let reap = match summary.reap {
                    ReapOutcome::Reaped { deleted } => format!("{deleted} superseded rows deleted"),
                    ReapOutcome::Skipped { rows, threshold } => {
                        format!("reap skipped ({rows} < {threshold} rows)")
                    }
                };
                info!(
                    "{}: generation {}, {} rows in {} batches, {} [{:.1}s]",
                    outcome.request,
                    summary.generation,
                    summary.rows_written,
                    summary.batches,
                    reap,
                    summary.elapsed_seconds
                );
                if let Some(line) = summary.truncated_at_line {
                    warn!(
                        "{}: stopped at malformed line {}; rows after it were not loaded",
                        outcome.request, line
                    );
                }
            }
            // LoadError messages already embed their source
            Err(e) => error!("{}: {}", outcome.request, e),
        }
    }

    info!(
        "Run finished: {} of {} datasets loaded, {} failed, {} not attempted, {} rows written in {:.1}s",
        report.succeeded().count(),
        report.requested,
        report.failed().count(),
        report.not_attempted(),
        report.total_rows(),
        report.elapsed_seconds
    );
}
