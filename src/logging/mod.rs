//! Logging and observability
//!
//! - [`init_logging`] installs the global subscriber (console plus optional
//!   JSON rolling file)
//! - [`RunReporter`] receives per-run progress from the coordinator
//!
//! # Example
//!
//! ```no_run
//! use tally::logging::init_logging;
//! use tally::config::LoggingConfig;
//!
//! let config = LoggingConfig::console_only();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod reporter;
pub mod structured;

pub use reporter::{RunReporter, TracingReporter};
pub use structured::{init_logging, parse_log_level, LoggingGuard};
