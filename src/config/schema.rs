//! Configuration schema types
//!
//! This module defines the configuration structure for Tally. Every section
//! except the inputs has defaults, so a minimal file only names the source and
//! target objects.

use crate::config::SecretString;
use crate::domain::Location;
use serde::{Deserialize, Serialize};

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 1_000_000;

/// Largest accepted worker pool
pub const MAX_WORKER_COUNT: usize = 64;

/// Main Tally configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Delimited-text source extract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<InputConfig>,

    /// Newline-delimited JSON target extract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<InputConfig>,

    /// Reconciliation engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Object storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report persistence
    #[serde(default)]
    pub report: ReportConfig,

    /// Upload notification handling
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TallyConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        if let Some(source) = &self.source {
            source.location().map_err(|e| format!("source: {e}"))?;
        }
        if let Some(target) = &self.target {
            target.location().map_err(|e| format!("target: {e}"))?;
        }
        self.engine.validate()?;
        self.storage.validate()?;
        self.report.validate()?;
        self.trigger.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// One input object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Bucket holding the object
    pub bucket: String,

    /// Object path inside the bucket
    pub path: String,
}

impl InputConfig {
    /// Resolves the configured object location
    pub fn location(&self) -> Result<Location, String> {
        Location::new(&self.bucket, &self.path)
    }
}

/// Reconciliation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rows per batch on both sides
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Fixed size of the comparison worker pool
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Field delimiter of the source extract (a single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Stop submitting new batch pairs after this many seconds
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(format!(
                "engine.batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            ));
        }

        if !(1..=MAX_WORKER_COUNT).contains(&self.worker_count) {
            return Err(format!(
                "engine.worker_count must be between 1 and {MAX_WORKER_COUNT}, got {}",
                self.worker_count
            ));
        }

        self.delimiter_byte()?;

        if self.run_timeout_secs == Some(0) {
            return Err("engine.run_timeout_secs must be > 0 when set".to_string());
        }

        Ok(())
    }

    /// The delimiter as the single byte the source reader expects
    pub fn delimiter_byte(&self) -> Result<u8, String> {
        parse_delimiter(&self.delimiter)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            worker_count: default_worker_count(),
            delimiter: default_delimiter(),
            run_timeout_secs: None,
        }
    }
}

/// Parses a delimiter given as one ASCII character, or `tab`
pub fn parse_delimiter(raw: &str) -> Result<u8, String> {
    if raw.eq_ignore_ascii_case("tab") {
        return Ok(b'\t');
    }
    match raw.as_bytes() {
        [byte] if byte.is_ascii() && *byte != b'\n' && *byte != b'"' => Ok(*byte),
        _ => Err(format!(
            "delimiter must be a single ASCII character other than newline or quote, got '{raw}'"
        )),
    }
}

/// Object storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Buckets are directories under a local root
    #[default]
    Local,
    /// Buckets are served over HTTP below a base URL
    Http,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to use
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Base URL for the HTTP backend
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the HTTP backend
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        match self.backend {
            StorageBackend::Local => {
                if self.root.trim().is_empty() {
                    return Err("storage.root cannot be empty".to_string());
                }
            }
            StorageBackend::Http => {
                let base_url = self
                    .base_url
                    .as_deref()
                    .ok_or("storage.base_url is required when backend = 'http'")?;
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err("storage.base_url must start with http:// or https://".to_string());
                }
                if self.timeout_seconds == 0 {
                    return Err("storage.timeout_seconds must be > 0".to_string());
                }
            }
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            base_url: None,
            token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Report persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Persist reports after each run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bucket receiving the reports
    #[serde(default = "default_report_bucket")]
    pub bucket: String,

    /// Object path of the run summary table
    #[serde(default = "default_summary_path")]
    pub summary_path: String,

    /// Object path of the detailed mismatch table
    #[serde(default = "default_mismatches_path")]
    pub mismatches_path: String,

    /// Do not write the mismatch table when a run has no mismatches
    #[serde(default = "default_true")]
    pub skip_empty_mismatches: bool,

    /// Append each run's summary row to an existing summary table
    #[serde(default = "default_true")]
    pub append_summary: bool,
}

impl ReportConfig {
    fn validate(&self) -> Result<(), String> {
        self.summary_location()
            .map_err(|e| format!("report.summary_path: {e}"))?;
        self.mismatches_location()
            .map_err(|e| format!("report.mismatches_path: {e}"))?;
        if self.summary_path == self.mismatches_path {
            return Err("report.summary_path and report.mismatches_path must differ".to_string());
        }
        Ok(())
    }

    /// Location of the summary table
    pub fn summary_location(&self) -> Result<Location, String> {
        Location::new(&self.bucket, &self.summary_path)
    }

    /// Location of the mismatch table
    pub fn mismatches_location(&self) -> Result<Location, String> {
        Location::new(&self.bucket, &self.mismatches_path)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bucket: default_report_bucket(),
            summary_path: default_summary_path(),
            mismatches_path: default_mismatches_path(),
            skip_empty_mismatches: true,
            append_summary: true,
        }
    }
}

/// Upload notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Bucket used for notifications that do not name one
    #[serde(default = "default_trigger_bucket")]
    pub bucket: String,
}

impl TriggerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("trigger.bucket cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            bucket: default_trigger_bucket(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    100_000
}

fn default_worker_count() -> usize {
    4
}

fn default_delimiter() -> String {
    "|".to_string()
}

fn default_storage_root() -> String {
    ".".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_report_bucket() -> String {
    "reports".to_string()
}

fn default_summary_path() -> String {
    "data_quality_summary.csv".to_string()
}

fn default_mismatches_path() -> String {
    "detailed_mismatches.csv".to_string()
}

fn default_trigger_bucket() -> String {
    "uploads".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
