//! Result of comparing one batch pair

use crate::domain::MismatchRecord;
use serde::{Deserialize, Serialize};

/// Counts and mismatches for one positional batch pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Sequence number of the pair
    pub batch_sequence: u64,

    /// Rows in the source batch
    pub source_row_count: usize,

    /// Rows in the target batch
    pub target_row_count: usize,

    /// Field-level mismatches, possibly empty
    pub mismatches: Vec<MismatchRecord>,
}

impl BatchResult {
    /// Create an empty result for a pair
    pub fn new(batch_sequence: u64, source_row_count: usize, target_row_count: usize) -> Self {
        Self {
            batch_sequence,
            source_row_count,
            target_row_count,
            mismatches: Vec::new(),
        }
    }

    /// Record a mismatch
    pub fn add_mismatch(&mut self, mismatch: MismatchRecord) {
        self.mismatches.push(mismatch);
    }

    /// Number of mismatches
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.len()
    }

    /// Whether both sides had the same number of rows and every shared value matched
    pub fn is_clean(&self) -> bool {
        self.source_row_count == self.target_row_count && self.mismatches.is_empty()
    }
}
