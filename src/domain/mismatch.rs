//! Field-level mismatch records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of discrepancy recorded for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Values on a shared column differ at the same row index
    ValueMismatch,
}

impl ErrorKind {
    /// Stable textual form used in persisted reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValueMismatch => "value_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field that disagreed between a source row and its paired target row
///
/// `row_index` is only unique inside its batch; combine it with
/// `batch_sequence` to address a row across the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchRecord {
    /// Sequence number of the batch pair
    pub batch_sequence: u64,

    /// Row index within the batch
    pub row_index: usize,

    /// Lowercased field name
    pub field: String,

    /// Value on the source side
    pub source_value: String,

    /// Value on the target side
    pub target_value: String,

    /// Kind of discrepancy
    pub error_kind: ErrorKind,
}

impl MismatchRecord {
    /// Creates a value mismatch record
    pub fn value_mismatch(
        batch_sequence: u64,
        row_index: usize,
        field: impl Into<String>,
        source_value: impl Into<String>,
        target_value: impl Into<String>,
    ) -> Self {
        Self {
            batch_sequence,
            row_index,
            field: field.into(),
            source_value: source_value.into(),
            target_value: target_value.into(),
            error_kind: ErrorKind::ValueMismatch,
        }
    }

    /// Row address that is unique across the run
    pub fn global_row(&self) -> (u64, usize) {
        (self.batch_sequence, self.row_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_mismatch_constructor() {
        let record = MismatchRecord::value_mismatch(2, 7, "amt", "20", "21");
        assert_eq!(record.error_kind, ErrorKind::ValueMismatch);
        assert_eq!(record.global_row(), (2, 7));
        assert_eq!(record.field, "amt");
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ValueMismatch).unwrap();
        assert_eq!(json, "\"value_mismatch\"");
        assert_eq!(ErrorKind::ValueMismatch.to_string(), "value_mismatch");
    }
}
