//! Report command implementation
//!
//! Reads back the persisted summary or mismatch table.

use super::{load_or_default, EXIT_CONFIG, EXIT_OK, EXIT_STORAGE};
use crate::adapters::storage::create_object_store;
use crate::config::TallyConfig;
use crate::core::report::ReportQuery;
use crate::domain::{Location, TallyError};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub action: ReportAction,
}

/// Report operations
#[derive(Subcommand, Debug)]
pub enum ReportAction {
    /// Print a persisted report as JSON rows
    Show {
        /// Show the mismatch table instead of the summary
        #[arg(long)]
        mismatches: bool,

        /// Only the most recent summary row
        #[arg(long, conflicts_with = "mismatches")]
        latest: bool,
    },

    /// Copy a persisted report's raw CSV to a file or stdout
    Download {
        /// Download the mismatch table instead of the summary
        #[arg(long)]
        mismatches: bool,

        /// Destination file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl ReportAction {
    fn location(&self, config: &TallyConfig) -> Result<Location, String> {
        let mismatches = match self {
            ReportAction::Show { mismatches, .. } | ReportAction::Download { mismatches, .. } => {
                *mismatches
            }
        };
        if mismatches {
            config.report.mismatches_location()
        } else {
            config.report.summary_location()
        }
    }
}

impl ReportArgs {
    /// Execute the report command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        let location = match self.action.location(&config) {
            Ok(location) => location,
            Err(e) => {
                eprintln!("❌ {e}");
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
        let query = ReportQuery::new(store);

        tracing::info!(location = %location, "Reading report");
        let result = match &self.action {
            ReportAction::Show { latest: true, .. } => {
                query.latest_summary(&location).await.and_then(|row| {
                    Ok(serde_json::to_string_pretty(&row)?)
                })
            }
            ReportAction::Show { .. } => query
                .fetch_rows(&location)
                .await
                .and_then(|rows| Ok(serde_json::to_string_pretty(&rows)?)),
            ReportAction::Download { output, .. } => {
                download(&query, &location, output.clone()).await.map(|bytes| {
                    format!("💾 {bytes} bytes from {location}")
                })
            }
        };

        match result {
            Ok(text) => {
                match &self.action {
                    ReportAction::Download { output: None, .. } => eprintln!("{text}"),
                    _ => println!("{text}"),
                }
                Ok(EXIT_OK)
            }
            Err(e) => {
                eprintln!("❌ {e}");
                Ok(EXIT_STORAGE)
            }
        }
    }
}

async fn download(
    query: &ReportQuery,
    location: &Location,
    output: Option<PathBuf>,
) -> crate::domain::Result<u64> {
    let mut stream = query.download(location).await?;
    tokio::task::spawn_blocking(move || -> crate::domain::Result<u64> {
        let copied = match output {
            Some(path) => {
                let mut file = std::fs::File::create(&path)?;
                std::io::copy(&mut stream, &mut file)?
            }
            None => std::io::copy(&mut stream, &mut std::io::stdout().lock())?,
        };
        Ok(copied)
    })
    .await
    .map_err(|e| TallyError::Io(format!("Download task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn setup() -> (TempDir, NamedTempFile) {
        let data = TempDir::new().unwrap();
        std::fs::create_dir_all(data.path().join("reports")).unwrap();
        std::fs::write(
            data.path().join("reports/data_quality_summary.csv"),
            "source_records,target_records,completeness_percentage,mismatch_count,test_timestamp\n\
             2,2,100.0,0,2025-01-01T00:00:00+00:00\n",
        )
        .unwrap();

        let mut config = NamedTempFile::new().unwrap();
        write!(config, "[storage]\nroot = \"{}\"\n", data.path().display()).unwrap();
        (data, config)
    }

    #[tokio::test]
    async fn test_show_summary() {
        let (_data, config) = setup();
        let args = ReportArgs {
            action: ReportAction::Show {
                mismatches: false,
                latest: true,
            },
        };
        let code = args.execute(config.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_download_to_file() {
        let (data, config) = setup();
        let output = data.path().join("copy.csv");
        let args = ReportArgs {
            action: ReportAction::Download {
                mismatches: false,
                output: Some(output.clone()),
            },
        };
        let code = args.execute(config.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, EXIT_OK);
        assert!(std::fs::read_to_string(output)
            .unwrap()
            .starts_with("source_records,"));
    }

    #[tokio::test]
    async fn test_missing_mismatch_table() {
        let (_data, config) = setup();
        let args = ReportArgs {
            action: ReportAction::Show {
                mismatches: true,
                latest: false,
            },
        };
        let code = args.execute(config.path().to_str().unwrap()).await.unwrap();
        assert_eq!(code, EXIT_STORAGE);
    }
}
