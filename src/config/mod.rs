//! Configuration management for Tally.
//!
//! Tally reads a TOML file (by default `tally.toml`) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TALLY_<SECTION>_<KEY>` overrides applied after parsing
//! - Default values for everything except the input objects
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! bucket = "landing"
//! path = "extracts/customers.txt"
//!
//! [target]
//! bucket = "landing"
//! path = "extracts/customers.json"
//!
//! [engine]
//! batch_size = 100000
//! worker_count = 4
//! delimiter = "|"
//!
//! [storage]
//! backend = "http"
//! base_url = "https://objects.example.com/v1"
//! token = "${TALLY_STORAGE_TOKEN}"
//! ```
//!
//! # Sections
//!
//! - [`ApplicationConfig`] - log level
//! - [`InputConfig`] - source and target object locations
//! - [`EngineConfig`] - batch size, worker pool, delimiter, run timeout
//! - [`StorageConfig`] - object storage backend
//! - [`ReportConfig`] - where summaries and mismatch tables are written
//! - [`TriggerConfig`] - upload notification handling
//! - [`LoggingConfig`] - local log files

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    parse_delimiter, ApplicationConfig, EngineConfig, InputConfig, LoggingConfig, ReportConfig,
    StorageBackend, StorageConfig, TallyConfig, TriggerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
