//! Progress reporting for reconciliation runs
//!
//! The coordinator emits its lifecycle through a [`RunReporter`]. The default
//! [`TracingReporter`] turns each event into a structured tracing record; tests
//! and embedders can inject their own.

use crate::core::reconcile::{BatchError, ComparisonJob, RunSummary};
use crate::core::compare::BatchResult;
use uuid::Uuid;

/// Observer of one reconciliation run
///
/// Callbacks for a run arrive from the single aggregating task, in completion
/// order, so implementations need no ordering logic of their own.
pub trait RunReporter: Send + Sync {
    /// Both inputs opened and the run is about to start
    fn run_started(&self, run_id: Uuid, job: &ComparisonJob);

    /// One batch pair has been compared
    fn batch_completed(&self, result: &BatchResult);

    /// One batch position could not be compared
    fn batch_failed(&self, error: &BatchError);

    /// The run has finished, normally or after an interruption
    fn run_completed(&self, summary: &RunSummary);
}

/// Reporter that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn run_started(&self, run_id: Uuid, job: &ComparisonJob) {
        tracing::info!(
            run_id = %run_id,
            source = %job.source(),
            target = %job.target(),
            batch_size = job.batch_size(),
            worker_count = job.worker_count(),
            "Starting reconciliation run"
        );
    }

    fn batch_completed(&self, result: &BatchResult) {
        tracing::debug!(
            batch = result.batch_sequence,
            source_rows = result.source_row_count,
            target_rows = result.target_row_count,
            mismatches = result.mismatch_count(),
            "Batch compared"
        );
    }

    fn batch_failed(&self, error: &BatchError) {
        tracing::warn!(
            batch = error.batch_sequence,
            side = %error.side,
            error = %error.message,
            "Batch skipped"
        );
    }

    fn run_completed(&self, summary: &RunSummary) {
        summary.log_summary();
    }
}
