//! Batch model shared by both readers and the comparator
//!
//! A batch is a bounded, ordered group of rows drawn from one input stream.
//! Rows are stored positionally against the batch's column list, so a row is
//! a mapping from column name to string value without repeating the keys.

use std::collections::HashMap;

/// An ordered group of rows from one side of a reconciliation
///
/// Column names are stored lowercased, so `ID` in one record and `id` in the
/// next land in the same column.
///
/// # Examples
///
/// ```
/// use tally::domain::Batch;
///
/// let mut batch = Batch::new(0);
/// batch.push_record([("ID".to_string(), "1".to_string())]);
/// batch.push_record([
///     ("id".to_string(), "2".to_string()),
///     ("amt".to_string(), "20".to_string()),
/// ]);
///
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.columns(), ["id", "amt"]);
/// assert_eq!(batch.value(0, 1), "");
/// assert_eq!(batch.value(1, 1), "20");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    sequence: u64,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
    skipped: u64,
}

impl Batch {
    /// Creates an empty batch with no columns
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            ..Self::default()
        }
    }

    /// Creates an empty batch with a fixed, positional column list
    ///
    /// Names are lowercased. Duplicates keep their positions; lookups by
    /// name resolve to the first one.
    pub fn with_columns(sequence: u64, columns: Vec<String>) -> Self {
        let mut batch = Self::new(sequence);
        batch.columns = columns.iter().map(|c| c.to_lowercase()).collect();
        for (idx, column) in batch.columns.iter().enumerate() {
            batch.index.entry(column.clone()).or_insert(idx);
        }
        batch
    }

    /// Builds a batch from name/value records, collecting the column union
    /// in first-seen order
    pub fn from_records<R, F>(sequence: u64, records: R) -> Self
    where
        R: IntoIterator<Item = F>,
        F: IntoIterator<Item = (String, String)>,
    {
        let mut batch = Self::new(sequence);
        for record in records {
            batch.push_record(record);
        }
        batch
    }

    /// Appends a positional row aligned with the batch's columns
    pub fn push_row(&mut self, values: Vec<String>) {
        self.rows.push(values);
    }

    /// Appends a row given as name/value pairs, growing the column list when a
    /// name is seen for the first time
    ///
    /// Names are matched case-insensitively; a repeated name inside one
    /// record keeps its first value.
    pub fn push_record<F>(&mut self, fields: F)
    where
        F: IntoIterator<Item = (String, String)>,
    {
        let mut row: Vec<Option<String>> = vec![None; self.columns.len()];
        for (name, value) in fields {
            let idx = self.column_index(name);
            if idx >= row.len() {
                row.resize(idx + 1, None);
            }
            if row[idx].is_none() {
                row[idx] = Some(value);
            }
        }
        self.rows
            .push(row.into_iter().map(Option::unwrap_or_default).collect());
    }

    /// Records lines the reader skipped while filling this batch
    pub fn add_skipped(&mut self, count: u64) {
        self.skipped += count;
    }

    /// Position of this batch in its stream, starting at zero
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Lowercased column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lines skipped as unparseable while this batch was filled
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Value at a row and column position; absent cells read as empty
    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Iterates one row as `(column, value)` pairs
    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .map(move |(idx, column)| (column.as_str(), self.value(row, idx)))
    }

    fn column_index(&mut self, name: String) -> usize {
        let name = name.to_lowercase();
        if let Some(&idx) = self.index.get(&name) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(name.clone());
        self.index.insert(name, idx);
        idx
    }
}
