//! Reconciliation coordinator - main orchestrator for a run
//!
//! Stages of a run:
//! 1. Open both inputs through the [`ObjectStore`] (the only fatal step)
//! 2. Pair batches positionally on a blocking thread
//! 3. Compare pairs on a fixed pool of workers
//! 4. Reduce outcomes in this task, the single owner of all totals

use crate::adapters::storage::ObjectStore;
use crate::core::compare::compare_batches;
use crate::core::reader;
use crate::core::reconcile::pairing::{pair_batches, BatchPair, PairingReport, StopCondition};
use crate::core::reconcile::summary::{BatchError, BatchOutcome, BatchSide, RunAccumulator, RunOutput};
use crate::core::reconcile::ComparisonJob;
use crate::domain::{Result, TallyError};
use crate::logging::{RunReporter, TracingReporter};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::Instrument;
use uuid::Uuid;

/// Reconciliation coordinator
pub struct ReconciliationCoordinator {
    store: Arc<dyn ObjectStore>,
    reporter: Arc<dyn RunReporter>,
    shutdown_signal: watch::Receiver<bool>,
}

impl ReconciliationCoordinator {
    /// Create a coordinator reading from `store`
    ///
    /// Setting `shutdown_signal` to `true` stops submission of further pairs;
    /// comparisons already in flight still finish and are counted.
    pub fn new(store: Arc<dyn ObjectStore>, shutdown_signal: watch::Receiver<bool>) -> Self {
        Self {
            store,
            reporter: Arc::new(TracingReporter),
            shutdown_signal,
        }
    }

    /// Replace the default tracing reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn RunReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Execute one reconciliation run
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::SourceOpen`] or [`TallyError::TargetOpen`] when an
    /// input cannot be opened. Every later failure is recorded in the summary
    /// instead.
    pub async fn run(&self, job: &ComparisonJob) -> Result<RunOutput> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "reconciliation_run",
            run_id = %run_id,
            source = %job.source(),
            target = %job.target(),
        );
        self.execute(run_id, job).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid, job: &ComparisonJob) -> Result<RunOutput> {
        let started = Instant::now();

        let source_stream = self.store.open(job.source()).await.map_err(|e| {
            TallyError::SourceOpen {
                location: job.source().to_string(),
                message: e.to_string(),
            }
        })?;
        let target_stream = self.store.open(job.target()).await.map_err(|e| {
            TallyError::TargetOpen {
                location: job.target().to_string(),
                message: e.to_string(),
            }
        })?;

        self.reporter.run_started(run_id, job);

        let source = reader::source_batches(source_stream, job.delimiter(), job.batch_size());
        let target = reader::target_batches(target_stream, job.batch_size());

        let workers = job.worker_count();
        let (pair_tx, pair_rx) = mpsc::channel::<BatchPair>(workers);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<BatchOutcome>(workers * 2);

        let stop = StopCondition::new(
            self.shutdown_signal.clone(),
            // A deadline past what Instant can represent means no deadline.
            job.run_timeout()
                .and_then(|timeout| started.checked_add(timeout)),
        );
        let pairing_outcomes = outcome_tx.clone();
        let pairing = tokio::task::spawn_blocking(move || {
            pair_batches(source, target, pair_tx, pairing_outcomes, stop)
        });

        let pair_rx = Arc::new(Mutex::new(pair_rx));
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let pairs = Arc::clone(&pair_rx);
            let outcomes = outcome_tx.clone();
            handles.push(tokio::spawn(
                compare_worker(worker_id, pairs, outcomes).in_current_span(),
            ));
        }
        // The outcome channel closes once the pairing stage and every worker are done.
        drop(outcome_tx);

        let mut accumulator = RunAccumulator::new();
        while let Some(outcome) = outcome_rx.recv().await {
            match &outcome {
                BatchOutcome::Compared(result) => self.reporter.batch_completed(result),
                BatchOutcome::Failed(error) => self.reporter.batch_failed(error),
            }
            accumulator.absorb(outcome);
        }

        let pairing = match pairing.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Pairing stage failed");
                PairingReport {
                    stop_reason: Some(format!("Pairing stage failed: {e}")),
                    ..PairingReport::default()
                }
            }
        };

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Comparison worker failed");
            }
        }

        let output = accumulator.finish(run_id, job, &pairing, started.elapsed());
        self.reporter.run_completed(&output.summary);
        Ok(output)
    }
}

/// Pull pairs until the pairing stage closes the channel
///
/// Each comparison runs on the blocking pool; a panic inside one becomes a
/// batch error for that position.
async fn compare_worker(
    worker_id: usize,
    pairs: Arc<Mutex<mpsc::Receiver<BatchPair>>>,
    outcomes: mpsc::Sender<BatchOutcome>,
) {
    let mut compared = 0usize;
    loop {
        let next = { pairs.lock().await.recv().await };
        let Some(pair) = next else {
            break;
        };

        let sequence = pair.sequence;
        let outcome =
            match tokio::task::spawn_blocking(move || compare_batches(&pair.source, &pair.target))
                .await
            {
                Ok(result) => BatchOutcome::Compared(result),
                Err(e) => BatchOutcome::Failed(BatchError::new(
                    sequence,
                    BatchSide::Comparison,
                    format!("Comparison task failed: {e}"),
                )),
            };

        if outcomes.send(outcome).await.is_err() {
            break;
        }
        compared += 1;
    }
    tracing::debug!(worker_id, compared, "Comparison worker finished");
}
