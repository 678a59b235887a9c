//! Validate config command implementation

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, StorageBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        match (&config.source, &config.target) {
            (Some(source), Some(target)) => {
                println!("  Source: {}/{}", source.bucket, source.path);
                println!("  Target: {}/{}", target.bucket, target.path);
            }
            _ => println!("  Inputs: not configured (pass --source/--target or use `listen`)"),
        }
        println!("  Batch Size: {}", config.engine.batch_size);
        println!("  Workers: {}", config.engine.worker_count);
        println!("  Delimiter: {:?}", config.engine.delimiter);
        if let Some(timeout) = config.engine.run_timeout_secs {
            println!("  Run Timeout: {timeout}s");
        }
        match config.storage.backend {
            StorageBackend::Local => println!("  Storage: local ({})", config.storage.root),
            StorageBackend::Http => println!(
                "  Storage: http ({}, token {})",
                config.storage.base_url.as_deref().unwrap_or_default(),
                if config.storage.token.is_some() { "set" } else { "not set" }
            ),
        }
        if config.report.enabled {
            println!(
                "  Reports: {}/{{{}, {}}}",
                config.report.bucket, config.report.summary_path, config.report.mismatches_path
            );
        } else {
            println!("  Reports: disabled");
        }
        println!("  Trigger Bucket: {}", config.trigger.bucket);
        println!();
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nbatch_size = 10\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_validate_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nworker_count = 0\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("does-not-exist-tally.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
