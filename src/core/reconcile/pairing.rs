//! Positional pairing of source and target batches
//!
//! Runs on one blocking thread and owns both readers. The Nth source batch is
//! paired with the Nth target batch by arrival order only; once one side is
//! exhausted the other side's remaining batches are paired with empty batches.

use crate::core::reader::{SourceBatches, TargetBatches};
use crate::core::reconcile::summary::{BatchError, BatchOutcome, BatchSide};
use crate::domain::{Batch, Result};
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// One unit of comparison work
#[derive(Debug)]
pub struct BatchPair {
    pub sequence: u64,
    pub source: Batch,
    pub target: Batch,
}

/// Totals known only to the pairing stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingReport {
    /// Pairs handed to the worker pool
    pub batch_pairs: u64,

    pub source_parse_errors: u64,

    pub target_parse_errors: u64,

    /// Set when submission stopped before both readers were exhausted
    pub stop_reason: Option<String>,
}

/// Conditions that stop submission of further pairs
#[derive(Debug, Clone)]
pub struct StopCondition {
    shutdown: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl StopCondition {
    pub fn new(shutdown: watch::Receiver<bool>, deadline: Option<Instant>) -> Self {
        Self { shutdown, deadline }
    }

    /// Reason to stop, if any
    pub fn check(&self) -> Option<String> {
        if *self.shutdown.borrow() {
            return Some("Shutdown signal received".to_string());
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some("Run timeout exceeded".to_string())
            }
            _ => None,
        }
    }
}

/// One side of the pairing loop
struct Side<I> {
    batches: I,
    side: BatchSide,
    done: bool,
}

impl<I: Iterator<Item = Result<Batch>>> Side<I> {
    fn new(batches: I, side: BatchSide) -> Self {
        Self {
            batches,
            side,
            done: false,
        }
    }

    /// Next batch at `sequence`, or `None` once this side has ended
    ///
    /// A reader failure is reported as a batch error for this position and
    /// ends the side.
    fn next(&mut self, sequence: u64, outcomes: &mpsc::Sender<BatchOutcome>) -> Option<Batch> {
        if self.done {
            return None;
        }
        match self.batches.next() {
            Some(Ok(batch)) => Some(batch),
            Some(Err(e)) => {
                self.done = true;
                tracing::warn!(
                    batch = sequence,
                    side = %self.side,
                    error = %e,
                    "Reader failed; treating side as exhausted"
                );
                let error = BatchError::new(sequence, self.side, e.to_string());
                // A closed channel means the aggregator is gone and the run is over.
                let _ = outcomes.blocking_send(BatchOutcome::Failed(error));
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Drive both readers to completion, sending pairs to the worker pool
///
/// Must be called from a blocking thread.
pub fn pair_batches(
    source: SourceBatches,
    target: TargetBatches,
    pairs: mpsc::Sender<BatchPair>,
    outcomes: mpsc::Sender<BatchOutcome>,
    stop: StopCondition,
) -> PairingReport {
    let mut source = Side::new(source, BatchSide::Source);
    let mut target = Side::new(target, BatchSide::Target);
    let mut report = PairingReport::default();

    loop {
        if let Some(reason) = stop.check() {
            tracing::warn!(
                reason = %reason,
                submitted = report.batch_pairs,
                "Stopping batch submission"
            );
            report.stop_reason = Some(reason);
            break;
        }

        let sequence = report.batch_pairs;
        let source_batch = source.next(sequence, &outcomes);
        let target_batch = target.next(sequence, &outcomes);

        let pair = match (source_batch, target_batch) {
            (None, None) => break,
            (source_batch, target_batch) => BatchPair {
                sequence,
                source: source_batch.unwrap_or_else(|| Batch::new(sequence)),
                target: target_batch.unwrap_or_else(|| Batch::new(sequence)),
            },
        };

        if pairs.blocking_send(pair).is_err() {
            tracing::error!(batch = sequence, "Worker pool closed before pairing finished");
            break;
        }
        report.batch_pairs += 1;
    }

    report.source_parse_errors = source.batches.parse_errors();
    report.target_parse_errors = target.batches.parse_errors();
    report
}
