//! Report persistence
//!
//! Writes the run summary and the detailed mismatch table as CSV objects.
//! Persisting happens after the run has been computed; a failed write is
//! reported to the caller, who still holds the [`RunOutput`].

use crate::adapters::storage::ObjectStore;
use crate::config::ReportConfig;
use crate::core::reconcile::{RunOutput, RunSummary};
use crate::domain::{Location, MismatchRecord, Result, TallyError};
use serde::Serialize;
use std::sync::Arc;

/// One row of the summary table
#[derive(Debug, Serialize)]
struct SummaryRow {
    source_records: u64,
    target_records: u64,
    completeness_percentage: f64,
    mismatch_count: u64,
    test_timestamp: String,
}

impl From<&RunSummary> for SummaryRow {
    fn from(summary: &RunSummary) -> Self {
        Self {
            source_records: summary.total_source_records,
            target_records: summary.total_target_records,
            completeness_percentage: summary.completeness_percentage,
            mismatch_count: summary.mismatch_count,
            test_timestamp: summary.timestamp.to_rfc3339(),
        }
    }
}

/// One row of the mismatch table
#[derive(Debug, Serialize)]
struct MismatchRow<'a> {
    row_index: usize,
    field: &'a str,
    source_value: &'a str,
    target_value: &'a str,
    error_type: &'static str,
}

impl<'a> From<&'a MismatchRecord> for MismatchRow<'a> {
    fn from(record: &'a MismatchRecord) -> Self {
        Self {
            row_index: record.row_index,
            field: &record.field,
            source_value: &record.source_value,
            target_value: &record.target_value,
            error_type: record.error_kind.as_str(),
        }
    }
}

/// Render the summary as CSV, optionally with the header row
pub fn render_summary(summary: &RunSummary, include_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(include_header)
        .from_writer(Vec::new());
    writer.serialize(SummaryRow::from(summary))?;
    writer
        .into_inner()
        .map_err(|e| TallyError::Serialization(format!("CSV error: {e}")))
}

/// Render mismatch records as CSV with a header row
pub fn render_mismatches(mismatches: &[MismatchRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if mismatches.is_empty() {
        writer.write_record([
            "row_index",
            "field",
            "source_value",
            "target_value",
            "error_type",
        ])?;
    }
    for record in mismatches {
        writer.serialize(MismatchRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|e| TallyError::Serialization(format!("CSV error: {e}")))
}

/// Where a run's reports ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedReport {
    pub summary_location: Location,

    /// `None` when an empty mismatch table was skipped
    pub mismatches_location: Option<Location>,

    pub mismatch_rows: usize,
}

/// Writes run reports through an [`ObjectStore`]
pub struct ReportSink {
    store: Arc<dyn ObjectStore>,
    summary_location: Location,
    mismatches_location: Location,
    skip_empty_mismatches: bool,
    append_summary: bool,
}

impl ReportSink {
    /// Create a sink with default behaviour: skip empty mismatch tables, append summaries
    pub fn new(
        store: Arc<dyn ObjectStore>,
        summary_location: Location,
        mismatches_location: Location,
    ) -> Self {
        Self {
            store,
            summary_location,
            mismatches_location,
            skip_empty_mismatches: true,
            append_summary: true,
        }
    }

    /// Create a sink from the `[report]` section
    pub fn from_config(store: Arc<dyn ObjectStore>, config: &ReportConfig) -> Result<Self> {
        let summary_location = config
            .summary_location()
            .map_err(TallyError::Configuration)?;
        let mismatches_location = config
            .mismatches_location()
            .map_err(TallyError::Configuration)?;
        Ok(Self::new(store, summary_location, mismatches_location)
            .with_skip_empty_mismatches(config.skip_empty_mismatches)
            .with_append_summary(config.append_summary))
    }

    pub fn with_skip_empty_mismatches(mut self, skip: bool) -> Self {
        self.skip_empty_mismatches = skip;
        self
    }

    /// Append to an existing summary table instead of replacing it
    pub fn with_append_summary(mut self, append: bool) -> Self {
        self.append_summary = append;
        self
    }

    pub fn summary_location(&self) -> &Location {
        &self.summary_location
    }

    pub fn mismatches_location(&self) -> &Location {
        &self.mismatches_location
    }

    /// Persist a run's summary and mismatches
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::SinkWrite`] naming the object that could not be written.
    pub async fn persist(&self, output: &RunOutput) -> Result<PersistedReport> {
        let summary_bytes = self.summary_contents(&output.summary).await?;
        self.write(&self.summary_location, summary_bytes).await?;

        let mismatches_location = if output.mismatches.is_empty() && self.skip_empty_mismatches {
            tracing::debug!("No mismatches; skipping mismatch table");
            None
        } else {
            let bytes = render_mismatches(&output.mismatches)
                .map_err(|e| self.sink_error(&self.mismatches_location, e))?;
            self.write(&self.mismatches_location, bytes).await?;
            Some(self.mismatches_location.clone())
        };

        tracing::info!(
            summary = %self.summary_location,
            mismatches = mismatches_location.as_ref().map(|l| l.to_string()).unwrap_or_default(),
            mismatch_rows = output.mismatches.len(),
            "Reports persisted"
        );

        Ok(PersistedReport {
            summary_location: self.summary_location.clone(),
            mismatches_location,
            mismatch_rows: output.mismatches.len(),
        })
    }

    async fn summary_contents(&self, summary: &RunSummary) -> Result<Vec<u8>> {
        let render = |include_header| {
            render_summary(summary, include_header)
                .map_err(|e| self.sink_error(&self.summary_location, e))
        };

        if !self.append_summary {
            return render(true);
        }

        let existing = match self.store.exists(&self.summary_location).await {
            Ok(true) => self
                .store
                .read_all(&self.summary_location)
                .await
                .map_err(|e| self.sink_error(&self.summary_location, e))?,
            Ok(false) => Vec::new(),
            Err(e) => return Err(self.sink_error(&self.summary_location, e)),
        };

        if existing.iter().all(u8::is_ascii_whitespace) {
            return render(true);
        }

        let mut contents = existing;
        if contents.last() != Some(&b'\n') {
            contents.push(b'\n');
        }
        contents.extend(render(false)?);
        Ok(contents)
    }

    async fn write(&self, location: &Location, contents: Vec<u8>) -> Result<()> {
        self.store
            .write(location, contents)
            .await
            .map_err(|e| self.sink_error(location, e))
    }

    fn sink_error(&self, location: &Location, error: TallyError) -> TallyError {
        TallyError::SinkWrite {
            location: location.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalObjectStore;
    use crate::core::reconcile::{ComparisonJob, PairingReport, RunAccumulator, BatchOutcome};
    use crate::core::compare::BatchResult;
    use std::time::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn output(mismatches: &[(usize, &str, &str, &str)]) -> RunOutput {
        let mut result = BatchResult::new(0, 2, 2);
        for (row, field, source, target) in mismatches {
            result.add_mismatch(MismatchRecord::value_mismatch(0, *row, *field, *source, *target));
        }
        let mut acc = RunAccumulator::new();
        acc.absorb(BatchOutcome::Compared(result));
        let job = ComparisonJob::new(
            "in/source.txt".parse().unwrap(),
            "in/target.json".parse().unwrap(),
        );
        acc.finish(Uuid::new_v4(), &job, &PairingReport::default(), Duration::ZERO)
    }

    fn make_sink(dir: &TempDir) -> (Arc<dyn ObjectStore>, ReportSink) {
        let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(dir.path()));
        let sink = ReportSink::new(
            Arc::clone(&store),
            "reports/data_quality_summary.csv".parse().unwrap(),
            "reports/detailed_mismatches.csv".parse().unwrap(),
        );
        (store, sink)
    }

    fn read(dir: &TempDir, path: &str) -> String {
        std::fs::read_to_string(dir.path().join(path)).unwrap()
    }

    #[test]
    fn test_render_summary_columns() {
        let output = output(&[]);
        let text = String::from_utf8(render_summary(&output.summary, true).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("source_records,target_records,completeness_percentage,mismatch_count,test_timestamp")
        );
        assert!(lines.next().unwrap().starts_with("2,2,100.0,0,"));
    }

    #[test]
    fn test_render_mismatches_quotes_values() {
        let output = output(&[(1, "note", "a,b", "a;b")]);
        let text = String::from_utf8(render_mismatches(&output.mismatches).unwrap()).unwrap();
        assert_eq!(
            text,
            "row_index,field,source_value,target_value,error_type\n1,note,\"a,b\",a;b,value_mismatch\n"
        );
    }

    #[test]
    fn test_render_empty_mismatches_has_header() {
        let text = String::from_utf8(render_mismatches(&[]).unwrap()).unwrap();
        assert_eq!(text, "row_index,field,source_value,target_value,error_type\n");
    }

    #[tokio::test]
    async fn test_persist_writes_both_tables() {
        let dir = TempDir::new().unwrap();
        let (_store, sink) = make_sink(&dir);

        let report = sink.persist(&output(&[(1, "amt", "20", "21")])).await.unwrap();
        assert_eq!(report.mismatch_rows, 1);
        assert!(report.mismatches_location.is_some());

        let mismatches = read(&dir, "reports/detailed_mismatches.csv");
        assert!(mismatches.contains("1,amt,20,21,value_mismatch"));
    }

    #[tokio::test]
    async fn test_persist_skips_empty_mismatch_table() {
        let dir = TempDir::new().unwrap();
        let (_store, sink) = make_sink(&dir);

        let report = sink.persist(&output(&[])).await.unwrap();
        assert!(report.mismatches_location.is_none());
        assert!(!dir.path().join("reports/detailed_mismatches.csv").exists());

        let (_store, sink) = make_sink(&dir);
        let report = sink
            .with_skip_empty_mismatches(false)
            .persist(&output(&[]))
            .await
            .unwrap();
        assert!(report.mismatches_location.is_some());
    }

    #[tokio::test]
    async fn test_summary_rows_are_appended() {
        let dir = TempDir::new().unwrap();
        let (_store, sink) = make_sink(&dir);

        sink.persist(&output(&[])).await.unwrap();
        sink.persist(&output(&[])).await.unwrap();

        let summary = read(&dir, "reports/data_quality_summary.csv");
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("source_records,"));
        assert!(lines[1].starts_with("2,2,"));
        assert!(lines[2].starts_with("2,2,"));
    }

    #[tokio::test]
    async fn test_summary_replaced_when_not_appending() {
        let dir = TempDir::new().unwrap();
        let (_store, sink) = make_sink(&dir);
        let sink = sink.with_append_summary(false);

        sink.persist(&output(&[])).await.unwrap();
        sink.persist(&output(&[])).await.unwrap();

        assert_eq!(read(&dir, "reports/data_quality_summary.csv").lines().count(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_is_sink_error() {
        let dir = TempDir::new().unwrap();
        // A file where the bucket directory should be makes every write fail.
        std::fs::write(dir.path().join("reports"), b"").unwrap();
        let (_store, sink) = make_sink(&dir);

        let result = sink.with_append_summary(false).persist(&output(&[])).await;
        match result {
            Err(TallyError::SinkWrite { location, .. }) => {
                assert_eq!(location, "reports/data_quality_summary.csv");
            }
            other => panic!("expected SinkWrite, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mismatch_table_failure_names_mismatch_location() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the mismatch file fails only that write.
        std::fs::create_dir_all(dir.path().join("reports/detailed_mismatches.csv")).unwrap();
        let (_store, sink) = make_sink(&dir);

        let result = sink.persist(&output(&[(0, "amt", "1", "2")])).await;
        match result {
            Err(TallyError::SinkWrite { location, .. }) => {
                assert_eq!(location, "reports/detailed_mismatches.csv");
            }
            other => panic!("expected SinkWrite, got {other:?}"),
        }
        assert!(read(&dir, "reports/data_quality_summary.csv").starts_with("source_records"));
    }
}
