//! Reconciliation orchestration
//!
//! [`ReconciliationCoordinator::run`] turns a [`ComparisonJob`] into a
//! [`RunOutput`]: the [`RunSummary`] plus the full mismatch list.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally::adapters::storage::LocalObjectStore;
//! use tally::core::reconcile::{ComparisonJob, ReconciliationCoordinator};
//! use tokio::sync::watch;
//!
//! # async fn example() -> tally::domain::Result<()> {
//! let store = Arc::new(LocalObjectStore::new("/data"));
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//! let job = ComparisonJob::new(
//!     "landing/org1/source.txt".parse().unwrap(),
//!     "landing/org1/target.json".parse().unwrap(),
//! );
//! let output = ReconciliationCoordinator::new(store, shutdown_rx).run(&job).await?;
//! println!("completeness: {:.2}%", output.summary.completeness_percentage);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod job;
pub mod pairing;
pub mod summary;

pub use coordinator::ReconciliationCoordinator;
pub use job::{ComparisonJob, DEFAULT_BATCH_SIZE, DEFAULT_DELIMITER, DEFAULT_WORKER_COUNT};
pub use pairing::{BatchPair, PairingReport};
pub use summary::{
    completeness_percentage, BatchError, BatchOutcome, BatchSide, RunAccumulator, RunOutput,
    RunSummary,
};
