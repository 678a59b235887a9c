//! Listen command implementation
//!
//! Reads upload notifications (one JSON object per line) from stdin or a file
//! and runs a reconciliation each time a group receives its second file.

use super::{load_or_default, reconcile, EXIT_CONFIG, EXIT_INTERRUPTED, EXIT_OK};
use crate::adapters::storage::create_object_store;
use crate::adapters::trigger::{NotificationEvent, UploadTracker};
use crate::core::reconcile::ComparisonJob;
use clap::Args;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::watch;

/// Arguments for the listen command
#[derive(Args, Debug, Default)]
pub struct ListenArgs {
    /// Read notifications from this file instead of stdin
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Bucket for notifications that do not name one (overrides [trigger])
    #[arg(long)]
    pub bucket: Option<String>,

    /// Compute summaries without writing reports
    #[arg(long)]
    pub no_persist: bool,
}

impl ListenArgs {
    /// Execute the listen command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        if let Some(bucket) = &self.bucket {
            config.trigger.bucket = bucket.clone();
        }

        let store = match create_object_store(&config.storage) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let input: Box<dyn AsyncRead + Unpin + Send> = match &self.events {
            Some(path) => Box::new(tokio::fs::File::open(path).await?),
            None => Box::new(tokio::io::stdin()),
        };
        let mut lines = BufReader::new(input).lines();
        let mut tracker = UploadTracker::new(config.trigger.bucket.clone());
        let mut shutdown = shutdown_signal.clone();
        let mut exit_code = EXIT_OK;

        tracing::info!(bucket = %config.trigger.bucket, "Listening for upload notifications");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                Ok(()) = shutdown.changed() => {
                    tracing::info!("Shutdown signal received; no longer listening");
                    return Ok(EXIT_INTERRUPTED);
                }
            };
            let Some(line) = line else {
                break;
            };

            let event = match NotificationEvent::parse_line(&line) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring notification");
                    continue;
                }
            };

            let pair = match tracker.record(&event) {
                Ok(Some(pair)) => pair,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(name = %event.name, error = %e, "Ignoring notification");
                    continue;
                }
            };

            let job = ComparisonJob::with_engine(pair.source, pair.target, &config.engine)?;
            println!("🚀 Group {} complete: {} against {}", pair.group, job.source(), job.target());

            let code = reconcile(
                &config,
                store.clone(),
                &job,
                shutdown_signal.clone(),
                !self.no_persist,
                false,
            )
            .await?;
            if code == EXIT_INTERRUPTED {
                return Ok(code);
            }
            exit_code = exit_code.max(code);
        }

        if tracker.pending_groups() > 0 {
            tracing::warn!(
                pending = tracker.pending_groups(),
                "Notification feed ended with incomplete groups"
            );
        }
        Ok(exit_code)
    }
}
