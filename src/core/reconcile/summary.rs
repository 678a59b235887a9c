//! Run summary and result aggregation
//!
//! Workers never touch these types. The coordinator owns one
//! [`RunAccumulator`], feeds it every [`BatchOutcome`] in completion order and
//! turns it into a [`RunOutput`] once all pairs are done.

use crate::core::compare::BatchResult;
use crate::core::reconcile::pairing::PairingReport;
use crate::core::reconcile::ComparisonJob;
use crate::domain::MismatchRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Which part of a batch pair failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSide {
    /// The source reader
    Source,
    /// The target reader
    Target,
    /// The comparison task itself
    Comparison,
}

impl fmt::Display for BatchSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchSide::Source => "source",
            BatchSide::Target => "target",
            BatchSide::Comparison => "comparison",
        })
    }
}

/// A batch position that could not be compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Sequence number of the affected pair
    pub batch_sequence: u64,

    /// Where the failure happened
    pub side: BatchSide,

    /// Error message
    pub message: String,
}

impl BatchError {
    pub fn new(batch_sequence: u64, side: BatchSide, message: impl Into<String>) -> Self {
        Self {
            batch_sequence,
            side,
            message: message.into(),
        }
    }
}

/// What a worker hands back for one pair
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Compared(BatchResult),
    Failed(BatchError),
}

/// Terminal summary of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Identifier shared with the run's tracing span
    pub run_id: Uuid,

    /// Source location
    pub source: String,

    /// Target location
    pub target: String,

    /// Rows read from the source across all batches
    pub total_source_records: u64,

    /// Records read from the target across all batches
    pub total_target_records: u64,

    /// Target records as a percentage of source records; 0 for an empty source
    pub completeness_percentage: f64,

    /// Field-level mismatches across all batches
    pub mismatch_count: u64,

    /// Completion time
    pub timestamp: DateTime<Utc>,

    /// Batch pairs submitted for comparison
    pub batch_pairs: u64,

    /// Malformed source rows skipped
    pub source_parse_errors: u64,

    /// Malformed target lines skipped
    pub target_parse_errors: u64,

    /// Batch positions that could not be compared
    pub batch_errors: Vec<BatchError>,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Set when submission stopped before both inputs were exhausted
    pub interrupted: bool,

    /// Why submission stopped early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_reason: Option<String>,
}

impl RunSummary {
    /// Whether every source record has a target counterpart by count
    pub fn is_complete(&self) -> bool {
        self.total_source_records == self.total_target_records
    }

    /// Complete, no mismatches, no skipped rows or batches, not interrupted
    pub fn is_clean(&self) -> bool {
        self.is_complete()
            && self.mismatch_count == 0
            && self.source_parse_errors == 0
            && self.target_parse_errors == 0
            && self.batch_errors.is_empty()
            && !self.interrupted
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            source_records = self.total_source_records,
            target_records = self.total_target_records,
            completeness = format!("{:.2}%", self.completeness_percentage),
            mismatches = self.mismatch_count,
            batch_pairs = self.batch_pairs,
            duration_ms = self.duration.as_millis() as u64,
            "Reconciliation completed"
        );

        if self.source_parse_errors > 0 || self.target_parse_errors > 0 {
            tracing::warn!(
                source_parse_errors = self.source_parse_errors,
                target_parse_errors = self.target_parse_errors,
                "Malformed rows were skipped"
            );
        }

        for error in &self.batch_errors {
            tracing::warn!(
                batch = error.batch_sequence,
                side = %error.side,
                message = %error.message,
                "Batch error"
            );
        }

        if self.interrupted {
            tracing::warn!(
                reason = self.shutdown_reason.as_deref().unwrap_or("unknown"),
                "Run was interrupted before both inputs were exhausted"
            );
        }
    }
}

/// Completeness percentage with the zero-source guard
pub fn completeness_percentage(source_records: u64, target_records: u64) -> f64 {
    if source_records == 0 {
        return 0.0;
    }
    (target_records as f64 / source_records as f64) * 100.0
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub summary: RunSummary,

    /// Mismatches ordered by batch sequence, column-major inside each batch
    pub mismatches: Vec<MismatchRecord>,
}

/// Single-owner reduction of batch outcomes
///
/// All operations are sums or appends, so totals do not depend on the order
/// outcomes arrive in.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    total_source_records: u64,
    total_target_records: u64,
    mismatches: Vec<MismatchRecord>,
    batch_errors: Vec<BatchError>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the running totals
    pub fn absorb(&mut self, outcome: BatchOutcome) {
        match outcome {
            BatchOutcome::Compared(result) => self.absorb_result(result),
            BatchOutcome::Failed(error) => self.batch_errors.push(error),
        }
    }

    fn absorb_result(&mut self, result: BatchResult) {
        self.total_source_records += result.source_row_count as u64;
        self.total_target_records += result.target_row_count as u64;
        self.mismatches.extend(result.mismatches);
    }

    pub fn total_source_records(&self) -> u64 {
        self.total_source_records
    }

    pub fn total_target_records(&self) -> u64 {
        self.total_target_records
    }

    pub fn mismatch_count(&self) -> u64 {
        self.mismatches.len() as u64
    }

    pub fn batch_errors(&self) -> &[BatchError] {
        &self.batch_errors
    }

    /// Stamp the totals into a summary
    pub fn finish(
        mut self,
        run_id: Uuid,
        job: &ComparisonJob,
        pairing: &PairingReport,
        duration: Duration,
    ) -> RunOutput {
        // Stable sorts keep the column-major order inside each batch.
        self.mismatches.sort_by_key(|m| m.batch_sequence);
        self.batch_errors
            .sort_by_key(|e| (e.batch_sequence, e.side as u8));

        let summary = RunSummary {
            run_id,
            source: job.source().to_string(),
            target: job.target().to_string(),
            total_source_records: self.total_source_records,
            total_target_records: self.total_target_records,
            completeness_percentage: completeness_percentage(
                self.total_source_records,
                self.total_target_records,
            ),
            mismatch_count: self.mismatches.len() as u64,
            timestamp: Utc::now(),
            batch_pairs: pairing.batch_pairs,
            source_parse_errors: pairing.source_parse_errors,
            target_parse_errors: pairing.target_parse_errors,
            batch_errors: self.batch_errors,
            duration,
            interrupted: pairing.stop_reason.is_some(),
            shutdown_reason: pairing.stop_reason.clone(),
        };

        RunOutput {
            summary,
            mismatches: self.mismatches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn result(sequence: u64, source: usize, target: usize, mismatches: usize) -> BatchResult {
        let mut result = BatchResult::new(sequence, source, target);
        for row in 0..mismatches {
            result.add_mismatch(MismatchRecord::value_mismatch(sequence, row, "amt", "1", "2"));
        }
        result
    }

    fn job() -> ComparisonJob {
        ComparisonJob::new(
            "bucket/source.txt".parse().unwrap(),
            "bucket/target.json".parse().unwrap(),
        )
    }

    #[test_case(0, 0, 0.0 ; "empty source")]
    #[test_case(0, 25, 0.0 ; "empty source with targets")]
    #[test_case(100, 100, 100.0 ; "complete")]
    #[test_case(200, 50, 25.0 ; "quarter")]
    #[test_case(100, 150, 150.0 ; "more targets than sources")]
    fn test_completeness_percentage(source: u64, target: u64, expected: f64) {
        assert!((completeness_percentage(source, target) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_completeness_of_partial_target() {
        let pct = completeness_percentage(150, 100);
        assert!((pct - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_reduction_is_order_independent() {
        let outcomes = vec![
            BatchOutcome::Compared(result(0, 100, 100, 3)),
            BatchOutcome::Compared(result(1, 100, 97, 0)),
            BatchOutcome::Failed(BatchError::new(2, BatchSide::Target, "stream reset")),
            BatchOutcome::Compared(result(3, 50, 0, 0)),
            BatchOutcome::Compared(result(4, 7, 7, 5)),
        ];

        let mut forward = RunAccumulator::new();
        for outcome in outcomes.clone() {
            forward.absorb(outcome);
        }

        let mut reverse = RunAccumulator::new();
        for outcome in outcomes.into_iter().rev() {
            reverse.absorb(outcome);
        }

        assert_eq!(forward.total_source_records(), 257);
        assert_eq!(forward.total_target_records(), 204);
        assert_eq!(forward.mismatch_count(), 8);
        assert_eq!(forward.total_source_records(), reverse.total_source_records());
        assert_eq!(forward.total_target_records(), reverse.total_target_records());
        assert_eq!(forward.mismatch_count(), reverse.mismatch_count());

        let pairing = PairingReport::default();
        let a = forward.finish(Uuid::new_v4(), &job(), &pairing, Duration::ZERO);
        let b = reverse.finish(Uuid::new_v4(), &job(), &pairing, Duration::ZERO);
        assert_eq!(a.mismatches, b.mismatches);
        assert_eq!(a.summary.batch_errors, b.summary.batch_errors);
    }

    #[test]
    fn test_finish_builds_summary() {
        let mut acc = RunAccumulator::new();
        acc.absorb(BatchOutcome::Compared(result(1, 50, 0, 0)));
        acc.absorb(BatchOutcome::Compared(result(0, 100, 100, 1)));

        let pairing = PairingReport {
            batch_pairs: 2,
            source_parse_errors: 1,
            target_parse_errors: 0,
            stop_reason: None,
        };
        let output = acc.finish(Uuid::new_v4(), &job(), &pairing, Duration::from_millis(12));
        let summary = &output.summary;

        assert_eq!(summary.total_source_records, 150);
        assert_eq!(summary.total_target_records, 100);
        assert!((summary.completeness_percentage - 66.67).abs() < 0.01);
        assert_eq!(summary.mismatch_count, 1);
        assert_eq!(summary.batch_pairs, 2);
        assert_eq!(summary.source, "bucket/source.txt");
        assert!(!summary.interrupted);
        assert!(!summary.is_complete());
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_interrupted_summary() {
        let pairing = PairingReport {
            stop_reason: Some("Shutdown signal received".to_string()),
            ..PairingReport::default()
        };
        let output =
            RunAccumulator::new().finish(Uuid::new_v4(), &job(), &pairing, Duration::ZERO);
        assert!(output.summary.interrupted);
        assert_eq!(
            output.summary.shutdown_reason.as_deref(),
            Some("Shutdown signal received")
        );
        assert_eq!(output.summary.completeness_percentage, 0.0);
    }

    #[test]
    fn test_summary_serializes() {
        let output = RunAccumulator::new().finish(
            Uuid::new_v4(),
            &job(),
            &PairingReport::default(),
            Duration::ZERO,
        );
        let json = serde_json::to_value(&output.summary).unwrap();
        assert_eq!(json["total_source_records"], 0);
        assert_eq!(json["completeness_percentage"], 0.0);
        assert!(json.get("shutdown_reason").is_none());
    }
}
