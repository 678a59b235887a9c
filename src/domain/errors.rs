//! Domain error types
//!
//! This module defines the error hierarchy for Tally. Only failures to open
//! either input stream abort a reconciliation run; every other condition is
//! degraded into a counted or recorded discrepancy and surfaced in the
//! run summary.

use thiserror::Error;

/// Main Tally error type
///
/// This is the primary error type used throughout the application.
/// Third-party error types are converted into string payloads at the boundary.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The source stream could not be opened; fatal to the run
    #[error("Failed to open source {location}: {message}")]
    SourceOpen { location: String, message: String },

    /// The target stream could not be opened; fatal to the run
    #[error("Failed to open target {location}: {message}")]
    TargetOpen { location: String, message: String },

    /// A single malformed row or line
    #[error("Row parse error at line {line}: {message}")]
    RowParse { line: u64, message: String },

    /// Persisting a report failed after the summary was computed
    #[error("Failed to write report to {location}: {message}")]
    SinkWrite { location: String, message: String },

    /// Object storage errors outside of the open/write phases
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed or unusable trigger notifications
    #[error("Trigger error: {0}")]
    Trigger(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl TallyError {
    /// Whether this error aborts a reconciliation run
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(
            self,
            TallyError::SourceOpen { .. } | TallyError::TargetOpen { .. }
        )
    }
}

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        TallyError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        TallyError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TallyError {
    fn from(err: toml::de::Error) -> Self {
        TallyError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for TallyError {
    fn from(err: csv::Error) -> Self {
        TallyError::Serialization(format!("CSV error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_error_display() {
        let err = TallyError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_open_errors_are_fatal() {
        let source = TallyError::SourceOpen {
            location: "bucket/source.txt".to_string(),
            message: "not found".to_string(),
        };
        let target = TallyError::TargetOpen {
            location: "bucket/target.json".to_string(),
            message: "not found".to_string(),
        };
        assert!(source.is_fatal_to_run());
        assert!(target.is_fatal_to_run());
        assert_eq!(
            source.to_string(),
            "Failed to open source bucket/source.txt: not found"
        );
    }

    #[test]
    fn test_degraded_errors_are_not_fatal() {
        let parse = TallyError::RowParse {
            line: 7,
            message: "expected 3 fields, found 2".to_string(),
        };
        let sink = TallyError::SinkWrite {
            location: "reports/summary.csv".to_string(),
            message: "permission denied".to_string(),
        };
        assert!(!parse.is_fatal_to_run());
        assert!(!sink.is_fatal_to_run());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TallyError = io_err.into();
        assert!(matches!(err, TallyError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: TallyError = json_err.into();
        assert!(matches!(err, TallyError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: TallyError = toml_err.into();
        assert!(matches!(err, TallyError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_tally_error_implements_std_error() {
        let err = TallyError::Trigger("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
