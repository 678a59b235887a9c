//! Read-only access to persisted reports

use crate::adapters::storage::ObjectStore;
use crate::core::reader::ByteStream;
use crate::domain::{Location, Result, TallyError};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One report row keyed by column name
pub type ReportRow = Map<String, Value>;

/// Retrieves reports written by a [`ReportSink`](super::ReportSink)
pub struct ReportQuery {
    store: Arc<dyn ObjectStore>,
}

impl ReportQuery {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Fetch a report parsed into rows
    ///
    /// Cells are kept as JSON strings exactly as written.
    pub async fn fetch_rows(&self, location: &Location) -> Result<Vec<ReportRow>> {
        let bytes = self.store.read_all(location).await?;
        parse_rows(&bytes)
    }

    /// The most recent row of a summary table, if any
    pub async fn latest_summary(&self, location: &Location) -> Result<Option<ReportRow>> {
        Ok(self.fetch_rows(location).await?.pop())
    }

    /// Fetch a report as a raw byte stream
    pub async fn download(&self, location: &Location) -> Result<ByteStream> {
        self.store.open(location).await
    }
}

/// Parse CSV with a header row into rows
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<ReportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    reader
        .records()
        .map(|record| {
            let record = record.map_err(|e| {
                TallyError::Serialization(format!("Malformed report row: {e}"))
            })?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.to_string(), Value::String(value.to_string())))
                .collect())
        })
        .collect()
}
