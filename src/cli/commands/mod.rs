//! CLI command implementations
//!
//! Exit codes shared by all commands:
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | clean run |
//! | 1    | mismatches, count discrepancy or skipped rows/batches |
//! | 2    | configuration error |
//! | 4    | input or report storage error |
//! | 5    | fatal error |
//! | 130  | interrupted by a shutdown signal |

pub mod init;
pub mod listen;
pub mod report;
pub mod run;
pub mod validate;

use crate::adapters::storage::ObjectStore;
use crate::config::{load_config, parse_config, TallyConfig};
use crate::core::reconcile::{ComparisonJob, ReconciliationCoordinator, RunSummary};
use crate::core::report::ReportSink;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

pub const EXIT_OK: i32 = 0;
pub const EXIT_DISCREPANCIES: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_STORAGE: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Load the configuration file, or defaults plus `TALLY_*` overrides when it does not exist
pub fn load_or_default(config_path: &str) -> crate::domain::Result<TallyConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::info!(config_path = %config_path, "No configuration file; using defaults");
        parse_config("")
    }
}

/// Exit code for a completed run
pub fn summary_exit_code(summary: &RunSummary) -> i32 {
    if summary.interrupted {
        EXIT_INTERRUPTED
    } else if summary.is_clean() {
        EXIT_OK
    } else {
        EXIT_DISCREPANCIES
    }
}

/// Print a human-readable summary
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Reconciliation Summary:");
    println!("  Source: {}", summary.source);
    println!("  Target: {}", summary.target);
    println!("  Source Records: {}", summary.total_source_records);
    println!("  Target Records: {}", summary.total_target_records);
    println!("  Completeness: {:.2}%", summary.completeness_percentage);
    println!("  Mismatches: {}", summary.mismatch_count);
    println!("  Batch Pairs: {}", summary.batch_pairs);
    if summary.source_parse_errors > 0 || summary.target_parse_errors > 0 {
        println!(
            "  Skipped Rows: {} source, {} target",
            summary.source_parse_errors, summary.target_parse_errors
        );
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Completed: {}", summary.timestamp.to_rfc3339());

    if !summary.batch_errors.is_empty() {
        println!();
        println!("⚠️  Batch errors:");
        for error in &summary.batch_errors {
            println!(
                "  - batch {} ({}): {}",
                error.batch_sequence, error.side, error.message
            );
        }
    }

    if let Some(reason) = &summary.shutdown_reason {
        println!();
        println!("⚠️  Run interrupted: {reason}");
    }
    println!();
}

/// Run one job, print its summary and persist reports
///
/// The summary is printed before persisting, so it is not lost when a
/// report write fails.
pub async fn reconcile(
    config: &TallyConfig,
    store: Arc<dyn ObjectStore>,
    job: &ComparisonJob,
    shutdown_signal: watch::Receiver<bool>,
    persist: bool,
    json: bool,
) -> anyhow::Result<i32> {
    let coordinator = ReconciliationCoordinator::new(Arc::clone(&store), shutdown_signal);
    let output = match coordinator.run(job).await {
        Ok(output) => output,
        Err(e) if e.is_fatal_to_run() => {
            tracing::error!(error = %e, "Reconciliation aborted");
            eprintln!("❌ {e}");
            return Ok(EXIT_STORAGE);
        }
        Err(e) => {
            tracing::error!(error = %e, "Reconciliation failed");
            eprintln!("❌ Reconciliation failed: {e}");
            return Ok(EXIT_FATAL);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output.summary)?);
    } else {
        print_summary(&output.summary);
    }

    if persist && config.report.enabled {
        let sink = match ReportSink::from_config(store, &config.report) {
            Ok(sink) => sink,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        match sink.persist(&output).await {
            Ok(report) => {
                if !json {
                    println!("💾 Summary written to {}", report.summary_location);
                    if let Some(location) = &report.mismatches_location {
                        println!(
                            "💾 {} mismatches written to {}",
                            report.mismatch_rows, location
                        );
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist reports");
                eprintln!("❌ {e}");
                return Ok(EXIT_STORAGE);
            }
        }
    }

    Ok(summary_exit_code(&output.summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconcile::{PairingReport, RunAccumulator, BatchOutcome};
    use crate::core::compare::BatchResult;
    use std::time::Duration;
    use uuid::Uuid;

    fn summary(source: usize, target: usize, stop: Option<&str>) -> RunSummary {
        let mut acc = RunAccumulator::new();
        acc.absorb(BatchOutcome::Compared(BatchResult::new(0, source, target)));
        let job = ComparisonJob::new("b/s.txt".parse().unwrap(), "b/t.json".parse().unwrap());
        let pairing = PairingReport {
            stop_reason: stop.map(str::to_string),
            ..PairingReport::default()
        };
        acc.finish(Uuid::new_v4(), &job, &pairing, Duration::ZERO).summary
    }

    #[test]
    fn test_summary_exit_codes() {
        assert_eq!(summary_exit_code(&summary(10, 10, None)), EXIT_OK);
        assert_eq!(summary_exit_code(&summary(10, 9, None)), EXIT_DISCREPANCIES);
        assert_eq!(
            summary_exit_code(&summary(10, 10, Some("Shutdown signal received"))),
            EXIT_INTERRUPTED
        );
    }
}
