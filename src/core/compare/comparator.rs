//! Value-level comparison of one source batch against one target batch
//!
//! The comparator is a pure function of its two inputs. It lowercases column
//! names, intersects the two column sets, and walks every shared column over
//! the rows both batches have. Rows present on only one side are not flagged
//! here; they surface as a count discrepancy in the run summary.

use crate::core::compare::BatchResult;
use crate::domain::{Batch, MismatchRecord};
use std::collections::{BTreeMap, HashMap};

/// Compare two batches paired by position
///
/// The result carries the source batch's sequence number. Shared columns are
/// visited in sorted order, rows in ascending order within each column.
///
/// # Example
///
/// ```
/// use tally::core::compare::compare_batches;
/// use tally::domain::Batch;
///
/// fn record(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
///     pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
/// }
///
/// let source = Batch::from_records(0, vec![
///     record(&[("id", "1"), ("amt", "10")]),
///     record(&[("id", "2"), ("amt", "20")]),
/// ]);
/// let target = Batch::from_records(0, vec![
///     record(&[("ID", "1"), ("AMT", "10")]),
///     record(&[("ID", "2"), ("AMT", "21")]),
/// ]);
///
/// let result = compare_batches(&source, &target);
/// assert_eq!(result.source_row_count, 2);
/// assert_eq!(result.target_row_count, 2);
/// assert_eq!(result.mismatches.len(), 1);
/// assert_eq!(result.mismatches[0].row_index, 1);
/// assert_eq!(result.mismatches[0].field, "amt");
/// ```
pub fn compare_batches(source: &Batch, target: &Batch) -> BatchResult {
    let batch_sequence = source.sequence();
    let mut result = BatchResult::new(batch_sequence, source.len(), target.len());

    let source_columns = normalized_columns(source);
    let target_columns = normalized_columns(target);
    let rows = source.len().min(target.len());

    for (field, &source_idx) in &source_columns {
        let Some(&target_idx) = target_columns.get(field) else {
            continue;
        };

        for row in 0..rows {
            let source_value = source.value(row, source_idx);
            let target_value = target.value(row, target_idx);
            if source_value != target_value {
                result.add_mismatch(MismatchRecord::value_mismatch(
                    batch_sequence,
                    row,
                    field.clone(),
                    source_value,
                    target_value,
                ));
            }
        }
    }

    result
}

/// Columns whose lowercased names appear on both sides of a pair
pub fn shared_columns(source: &Batch, target: &Batch) -> Vec<String> {
    let target_columns = normalized_columns(target);
    normalized_columns(source)
        .into_keys()
        .filter(|name| target_columns.contains_key(name))
        .collect()
}

/// Lowercased column name to position; the first of any colliding names wins
fn normalized_columns(batch: &Batch) -> BTreeMap<String, usize> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, column) in batch.columns().iter().enumerate() {
        seen.entry(column.to_lowercase()).or_insert(idx);
    }
    seen.into_iter().collect()
}
