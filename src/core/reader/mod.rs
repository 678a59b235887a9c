//! Chunked readers for both sides of a reconciliation
//!
//! - [`DelimitedBatchReader`] - delimited-text source extracts
//! - [`NdjsonBatchReader`] - newline-delimited JSON target extracts
//!
//! Both are plain [`Iterator`]s over `Result<Batch>`: lazy, finite and
//! non-restartable. A reader yields an `Err` item at most once, for a failure
//! of the underlying stream, and then ends.

pub mod source;
pub mod target;

pub use source::DelimitedBatchReader;
pub use target::{stringify_value, NdjsonBatchReader};

use std::io::{BufReader, Read};

/// Boxed byte stream handed over by object storage
pub type ByteStream = Box<dyn Read + Send>;

/// Source reader over a storage stream
pub type SourceBatches = DelimitedBatchReader<ByteStream>;

/// Target reader over a storage stream
pub type TargetBatches = NdjsonBatchReader<BufReader<ByteStream>>;

/// Build the source reader for an opened stream
pub fn source_batches(stream: ByteStream, delimiter: u8, batch_size: usize) -> SourceBatches {
    DelimitedBatchReader::new(stream, delimiter, batch_size)
}

/// Build the target reader for an opened stream
pub fn target_batches(stream: ByteStream, batch_size: usize) -> TargetBatches {
    NdjsonBatchReader::new(BufReader::new(stream), batch_size)
}
