//! Chunked reader for newline-delimited JSON target extracts
//!
//! Each non-blank line consumes one slot of the current batch. Lines that are
//! not a JSON object are skipped and counted, so a batch holding a bad line
//! comes out one row short of the nominal size.

use crate::domain::{Batch, Result, TallyError};
use serde_json::Value;
use std::io::BufRead;

/// Lazy, non-restartable iterator of target batches
///
/// Only the batch being filled is buffered.
///
/// # Example
///
/// ```
/// use tally::core::reader::NdjsonBatchReader;
///
/// let data = "{\"ID\":\"1\"}\nnot json\n{\"ID\":\"3\"}\n";
/// let mut reader = NdjsonBatchReader::new(data.as_bytes(), 10);
/// let batch = reader.next().unwrap().unwrap();
///
/// assert_eq!(batch.len(), 2);
/// assert_eq!(reader.parse_errors(), 1);
/// ```
pub struct NdjsonBatchReader<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    batch_size: usize,
    next_sequence: u64,
    line: u64,
    rows_read: u64,
    parse_errors: u64,
    pending_error: Option<TallyError>,
    finished: bool,
}

impl<R: BufRead> NdjsonBatchReader<R> {
    /// Create a reader producing batches of up to `batch_size` records
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            batch_size: batch_size.max(1),
            next_sequence: 0,
            line: 0,
            rows_read: 0,
            parse_errors: 0,
            pending_error: None,
            finished: false,
        }
    }

    /// Records successfully parsed so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Lines skipped as malformed so far
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }

    fn fill_batch(&mut self, batch: &mut Batch) {
        let mut consumed = 0;

        while consumed < self.batch_size {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => {
                    self.finished = true;
                    return;
                }
                Ok(_) => self.line += 1,
                Err(e) => {
                    self.pending_error = Some(TallyError::Io(format!(
                        "Target stream failed after line {}: {e}",
                        self.line
                    )));
                    self.finished = true;
                    return;
                }
            }

            let text = match std::str::from_utf8(&self.buffer) {
                Ok(text) => text.trim(),
                Err(e) => {
                    consumed += 1;
                    self.skip(batch, format!("invalid UTF-8: {e}"));
                    continue;
                }
            };

            if text.is_empty() {
                continue;
            }
            consumed += 1;

            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => {
                    batch.push_record(map.into_iter().map(|(k, v)| (k, stringify_value(v))));
                    self.rows_read += 1;
                }
                Ok(other) => {
                    let kind = json_kind(&other);
                    self.skip(batch, format!("expected a JSON object, found {kind}"));
                }
                Err(e) => self.skip(batch, e.to_string()),
            }
        }
    }

    fn skip(&mut self, batch: &mut Batch, message: String) {
        let error = TallyError::RowParse {
            line: self.line,
            message,
        };
        tracing::debug!(error = %error, "Skipping malformed target line");
        self.parse_errors += 1;
        batch.add_skipped(1);
    }
}

impl<R: BufRead> Iterator for NdjsonBatchReader<R> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending_error.take() {
            return Some(Err(error));
        }
        if self.finished {
            return None;
        }

        let mut batch = Batch::new(self.next_sequence);
        self.fill_batch(&mut batch);

        if batch.is_empty() && self.finished {
            return self.pending_error.take().map(Err);
        }

        self.next_sequence += 1;
        Some(Ok(batch))
    }
}

/// Canonical string form of a JSON value
///
/// Strings are taken verbatim, numbers and booleans by their JSON text, `null`
/// becomes the empty string, and arrays and objects are rendered as compact
/// JSON. No numeric normalization happens, so `10` and `10.0` stay distinct.
pub fn stringify_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
