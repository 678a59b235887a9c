//! Core reconciliation logic for Tally.
//!
//! # Modules
//!
//! - [`reader`] - chunked readers for the delimited source and NDJSON target
//! - [`compare`] - pure comparison of one positional batch pair
//! - [`reconcile`] - pairing, the worker pool and single-owner aggregation
//! - [`report`] - persisting and querying run reports
//!
//! # Run Workflow
//!
//! 1. **Open**: both inputs through the object store (failure aborts the run)
//! 2. **Pair**: Nth source batch with Nth target batch, by arrival order
//! 3. **Compare**: pairs in parallel on a fixed-size worker pool
//! 4. **Aggregate**: totals and mismatches reduced by one owner
//! 5. **Persist**: summary row and mismatch table written as CSV
//!
//! # Example
//!
//! ```rust,no_run
//! use tally::adapters::storage::create_object_store;
//! use tally::config::load_config;
//! use tally::core::reconcile::{ComparisonJob, ReconciliationCoordinator};
//! use tally::core::report::ReportSink;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tally.toml")?;
//! let store = create_object_store(&config.storage)?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let job = ComparisonJob::from_config(&config)?;
//! let output = ReconciliationCoordinator::new(store.clone(), shutdown_rx)
//!     .run(&job)
//!     .await?;
//!
//! ReportSink::from_config(store, &config.report)?
//!     .persist(&output)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod compare;
pub mod reader;
pub mod reconcile;
pub mod report;
