// Tally - Streaming Extract Reconciliation
// Copyright (c) 2025 Tally Contributors
// Licensed under the MIT License

//! # Tally - Streaming Extract Reconciliation
//!
//! Tally compares a delimited-text source extract with a newline-delimited
//! JSON target extract, both read as streams from object storage, and
//! reports how complete the target is and where values differ.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** both extracts in fixed-size batches without loading them whole
//! - **Pairing** batches by position and comparing them on a worker pool
//! - **Summarizing** record counts, completeness and value mismatches
//! - **Persisting** the summary and mismatch table as CSV reports
//! - **Triggering** runs from upload notifications
//!
//! ## Architecture
//!
//! Tally follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (readers, comparison, reconciliation, reports)
//! - [`adapters`] - External integrations (object storage, upload notifications)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and run reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally::adapters::storage::create_object_store;
//! use tally::config::load_config;
//! use tally::core::reconcile::{ComparisonJob, ReconciliationCoordinator};
//! use tally::core::report::ReportSink;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("tally.toml")?;
//!     let store = create_object_store(&config.storage)?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let job = ComparisonJob::from_config(&config)?;
//!     let output = ReconciliationCoordinator::new(Arc::clone(&store), shutdown_rx)
//!         .run(&job)
//!         .await?;
//!
//!     ReportSink::from_config(store, &config.report)?
//!         .persist(&output)
//!         .await?;
//!
//!     println!(
//!         "{} of {} records, {} mismatches",
//!         output.summary.total_target_records,
//!         output.summary.total_source_records,
//!         output.summary.mismatch_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Tally uses the [`domain::TallyError`] type for all library errors:
//!
//! ```rust,no_run
//! use tally::domain::TallyError;
//!
//! fn example() -> Result<(), TallyError> {
//!     let config = tally::config::load_config("tally.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Tally uses structured logging with the `tracing` crate. Every event of a
//! run is emitted inside a `reconciliation_run` span carrying the run id.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
