//! Chunked reader for delimited-text source extracts
//!
//! The first record is the header. Every following record consumes one slot of
//! the current batch; records whose field count differs from the header, or
//! that are not valid UTF-8, are skipped and counted instead of aborting.

use crate::domain::{Batch, Result, TallyError};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use std::io::Read;

/// Lazy, non-restartable iterator of source batches
///
/// # Example
///
/// ```
/// use tally::core::reader::DelimitedBatchReader;
///
/// let data = "id|amt\n1|10\n2|20\n3|30\n";
/// let batches: Vec<_> = DelimitedBatchReader::new(data.as_bytes(), b'|', 2)
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(batches.len(), 2);
/// assert_eq!(batches[0].len(), 2);
/// assert_eq!(batches[1].len(), 1);
/// ```
pub struct DelimitedBatchReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Option<Vec<String>>,
    batch_size: usize,
    next_sequence: u64,
    rows_read: u64,
    parse_errors: u64,
    pending_error: Option<TallyError>,
    finished: bool,
}

impl<R: Read> DelimitedBatchReader<R> {
    /// Create a reader over `reader` splitting fields on `delimiter`
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn new(reader: R, delimiter: u8, batch_size: usize) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        Self {
            reader,
            headers: None,
            batch_size: batch_size.max(1),
            next_sequence: 0,
            rows_read: 0,
            parse_errors: 0,
            pending_error: None,
            finished: false,
        }
    }

    /// Rows successfully parsed so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Rows skipped as malformed so far
    pub fn parse_errors(&self) -> u64 {
        self.parse_errors
    }

    fn load_headers(&mut self) -> Result<Vec<String>> {
        if let Some(headers) = &self.headers {
            return Ok(headers.clone());
        }

        let headers: Vec<String> = self
            .reader
            .byte_headers()
            .map_err(|e| TallyError::Io(format!("Failed to read source header: {e}")))?
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();

        tracing::debug!(columns = headers.len(), "Loaded source header");
        self.headers = Some(headers.clone());
        Ok(headers)
    }

    fn fill_batch(&mut self, batch: &mut Batch) {
        let mut record = ByteRecord::new();
        let mut consumed = 0;

        while consumed < self.batch_size {
            match self.reader.read_byte_record(&mut record) {
                Ok(true) => {
                    consumed += 1;
                    let line = record.position().map(|p| p.line()).unwrap_or_default();
                    match StringRecord::from_byte_record(record.clone()) {
                        Ok(fields) => {
                            batch.push_row(fields.iter().map(str::to_string).collect());
                            self.rows_read += 1;
                        }
                        Err(e) => self.skip(batch, line, &e.to_string()),
                    }
                }
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    match e.kind() {
                        csv::ErrorKind::Io(_) => {
                            self.pending_error = Some(TallyError::Io(format!(
                                "Source stream failed near line {line}: {e}"
                            )));
                            self.finished = true;
                            break;
                        }
                        _ => {
                            consumed += 1;
                            self.skip(batch, line, &e.to_string());
                        }
                    }
                }
            }
        }
    }

    fn skip(&mut self, batch: &mut Batch, line: u64, reason: &str) {
        let error = TallyError::RowParse {
            line,
            message: reason.to_string(),
        };
        tracing::debug!(error = %error, "Skipping malformed source row");
        self.parse_errors += 1;
        batch.add_skipped(1);
    }
}

impl<R: Read> Iterator for DelimitedBatchReader<R> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending_error.take() {
            return Some(Err(error));
        }
        if self.finished {
            return None;
        }

        let headers = match self.load_headers() {
            Ok(headers) => headers,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            }
        };

        let mut batch = Batch::with_columns(self.next_sequence, headers);
        self.fill_batch(&mut batch);

        if batch.is_empty() && self.finished {
            // Trailing batch without rows; skips are already counted.
            return self.pending_error.take().map(Err);
        }

        self.next_sequence += 1;
        Some(Ok(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(data: &str, delimiter: u8, batch_size: usize) -> Vec<Batch> {
        DelimitedBatchReader::new(data.as_bytes(), delimiter, batch_size)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_splits_into_fixed_size_batches() {
        let mut data = String::from("id|amt\n");
        for i in 0..150 {
            data.push_str(&format!("{i}|{}\n", i * 10));
        }

        let batches = read_all(&data, b'|', 100);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 100);
        assert_eq!(batches[1].len(), 50);
        assert_eq!(batches[0].sequence(), 0);
        assert_eq!(batches[1].sequence(), 1);
        assert_eq!(batches[1].value(0, 0), "100");
    }

    #[test]
    fn test_exact_multiple_omits_empty_trailing_batch() {
        let batches = read_all("id\n1\n2\n3\n4\n", b'|', 2);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn test_header_only_yields_nothing() {
        assert!(read_all("id|amt\n", b'|', 10).is_empty());
        assert!(read_all("", b'|', 10).is_empty());
    }

    #[test]
    fn test_header_is_lowercased() {
        let batches = read_all("ID,Name\n1,a\n", b',', 10);
        assert_eq!(batches[0].columns(), ["id", "name"]);
    }

    #[test]
    fn test_malformed_row_is_skipped_and_counted() {
        let data = "id|amt\n1|10\n2\n3|30|extra\n4|40\n";
        let mut reader = DelimitedBatchReader::new(data.as_bytes(), b'|', 10);
        let batch = reader.next().unwrap().unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.skipped(), 2);
        assert_eq!(batch.value(1, 0), "4");
        assert!(reader.next().is_none());
        assert_eq!(reader.parse_errors(), 2);
        assert_eq!(reader.rows_read(), 2);
    }

    #[test]
    fn test_malformed_row_consumes_a_batch_slot() {
        let batches = read_all("id|v\n1|a\n2\n3|c\n4|d\n", b'|', 2);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0].skipped(), 1);
        assert_eq!(batches[1].len(), 2);
    }

    #[test]
    fn test_trailing_batch_of_only_malformed_rows_is_omitted() {
        let mut reader = DelimitedBatchReader::new("id|v\n1|a\n2|b\n3\n".as_bytes(), b'|', 2);
        assert_eq!(reader.next().unwrap().unwrap().len(), 2);
        assert!(reader.next().is_none());
        assert_eq!(reader.parse_errors(), 1);
    }

    #[test]
    fn test_invalid_utf8_row_is_skipped() {
        let mut data = b"id|name\n1|ok\n2|".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\n3|fine\n");

        let mut reader = DelimitedBatchReader::new(data.as_slice(), b'|', 10);
        let batch = reader.next().unwrap().unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(reader.parse_errors(), 1);
    }

    #[test]
    fn test_quoted_delimiters_are_preserved() {
        let batches = read_all("id|note\n1|\"a|b\"\n", b'|', 10);
        assert_eq!(batches[0].value(0, 1), "a|b");
    }

    #[test]
    fn test_io_error_is_yielded_once() {
        struct Failing {
            served: bool,
        }
        impl Read for Failing {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.served {
                    return Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
                }
                self.served = true;
                let data = b"id\n1\n2\n";
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
        }

        let mut reader = DelimitedBatchReader::new(Failing { served: false }, b'|', 10);
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert!(matches!(reader.next(), Some(Err(TallyError::Io(_)))));
        assert!(reader.next().is_none());
    }
}
