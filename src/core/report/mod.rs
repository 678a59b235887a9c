//! Run reports
//!
//! - [`ReportSink`] persists a run's summary row and mismatch table as CSV
//! - [`ReportQuery`] reads persisted reports back, parsed or raw
//!
//! Summary columns: `source_records, target_records, completeness_percentage,
//! mismatch_count, test_timestamp`. Mismatch columns: `row_index, field,
//! source_value, target_value, error_type`.

pub mod query;
pub mod sink;

pub use query::{parse_rows, ReportQuery, ReportRow};
pub use sink::{render_mismatches, render_summary, PersistedReport, ReportSink};
