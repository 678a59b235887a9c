//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Tally using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Tally - streaming source/target extract reconciliation
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
#[command(author = "Tally Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "tally.toml", env = "TALLY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TALLY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile one source extract against one target extract
    Run(commands::run::RunArgs),

    /// Read upload notifications and reconcile each completed pair
    Listen(commands::listen::ListenArgs),

    /// Query persisted reports
    Report(commands::report::ReportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command reconciles and should log to files per `[logging]`
    pub fn is_long_running(&self) -> bool {
        matches!(self, Commands::Run(_) | Commands::Listen(_))
    }
}
