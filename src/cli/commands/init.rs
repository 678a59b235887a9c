//! Init command implementation
//!
//! Generates a starter `tally.toml`.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tally.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set [source] and [target] in {}", self.output);
                println!("  2. Validate configuration: tally validate-config");
                println!("  3. Reconcile: tally run");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Tally Configuration File

[application]
log_level = "info"

[source]
bucket = "landing"
path = "validation/org1/source.txt"

[target]
bucket = "landing"
path = "validation/org1/target.json"

[engine]
batch_size = 100000
worker_count = 4
delimiter = "|"

[storage]
backend = "local"
root = "./data"

[report]
bucket = "reports"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Tally Configuration File
#
# Values may reference environment variables with ${VAR_NAME}. Any key can
# also be overridden with TALLY_<SECTION>_<KEY>, e.g. TALLY_ENGINE_BATCH_SIZE.

[application]
# trace | debug | info | warn | error
log_level = "info"

# Delimited-text extract with a header row
[source]
bucket = "landing"
path = "validation/org1/source.txt"

# Newline-delimited JSON extract, one object per line
[target]
bucket = "landing"
path = "validation/org1/target.json"

[engine]
# Rows per batch on both sides (1 - 1000000)
batch_size = 100000
# Comparison workers (1 - 64)
worker_count = 4
# Single character, or "tab"
delimiter = "|"
# Stop submitting batches after this many seconds (in-flight batches finish)
# run_timeout_secs = 3600

[storage]
# local: buckets are directories under root
# http:  objects at <base_url>/<bucket>/<path>, GET to read, PUT to write
backend = "local"
root = "./data"
# base_url = "https://objects.example.com/v1"
# token = "${TALLY_STORAGE_TOKEN}"
timeout_seconds = 60

[report]
enabled = true
bucket = "reports"
summary_path = "data_quality_summary.csv"
mismatches_path = "detailed_mismatches.csv"
# Do not write the mismatch table for runs without mismatches
skip_empty_mismatches = true
# Keep one summary row per run instead of replacing the table
append_summary = true

[trigger]
# Bucket for notifications that do not name one
bucket = "uploads"

[logging]
local_enabled = true
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
