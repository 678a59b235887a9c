//! Run command implementation
//!
//! Reconciles one source/target pair named in configuration or on the
//! command line.

use super::{load_or_default, reconcile, EXIT_CONFIG};
use crate::adapters::storage::create_object_store;
use crate::config::InputConfig;
use crate::core::reconcile::ComparisonJob;
use crate::domain::Location;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source object as bucket/path (overrides [source])
    #[arg(long, value_name = "BUCKET/PATH")]
    pub source: Option<String>,

    /// Target object as bucket/path (overrides [target])
    #[arg(long, value_name = "BUCKET/PATH")]
    pub target: Option<String>,

    /// Rows per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Comparison worker count
    #[arg(long)]
    pub workers: Option<usize>,

    /// Source field delimiter (single character or "tab")
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Stop submitting batches after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Compute the summary without writing reports
    #[arg(long)]
    pub no_persist: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

fn input_override(raw: &str, flag: &str) -> Result<InputConfig, String> {
    let location: Location = raw
        .parse()
        .map_err(|e| format!("--{flag} '{raw}': {e}"))?;
    Ok(InputConfig {
        bucket: location.bucket().to_string(),
        path: location.path().to_string(),
    })
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Apply CLI overrides
        if let Some(raw) = &self.source {
            match input_override(raw, "source") {
                Ok(input) => config.source = Some(input),
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIG);
                }
            }
        }
        if let Some(raw) = &self.target {
            match input_override(raw, "target") {
                Ok(input) => config.target = Some(input),
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIG);
                }
            }
        }
        if let Some(batch_size) = self.batch_size {
            config.engine.batch_size = batch_size;
        }
        if let Some(workers) = self.workers {
            config.engine.worker_count = workers;
        }
        if let Some(delimiter) = &self.delimiter {
            config.engine.delimiter = delimiter.clone();
        }
        if let Some(timeout) = self.timeout {
            config.engine.run_timeout_secs = Some(timeout);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let job = match ComparisonJob::from_config(&config) {
            Ok(job) => job,
            Err(e) => {
                eprintln!("❌ {e}");
                eprintln!("   Set [source] and [target] in {config_path} or pass --source and --target");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_object_store(&config.storage) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if !self.json {
            println!("🚀 Reconciling {} against {}", job.source(), job.target());
        }

        reconcile(
            &config,
            store,
            &job,
            shutdown_signal,
            !self.no_persist,
            self.json,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_defaults() {
        let args = RunArgs::default();
        assert!(args.source.is_none());
        assert!(!args.no_persist);
        assert!(!args.json);
    }

    #[test]
    fn test_input_override() {
        let input = input_override("landing/org1/source.txt", "source").unwrap();
        assert_eq!(input.bucket, "landing");
        assert_eq!(input.path, "org1/source.txt");

        let err = input_override("landing", "source").unwrap_err();
        assert!(err.starts_with("--source 'landing'"));
    }
}
