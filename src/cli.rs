//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use gitdeps::output::OutputConfig;

/// gitdeps - Synchronize vendored git dependencies against the .gitdeps manifest
#[derive(Parser, Debug)]
#[command(name = "gitdeps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the working tree against the manifest
    Sync(commands::sync::SyncArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .format_target(false)
        .init();

        OutputConfig::from_env_and_flag(&self.color).apply();

        match self.command {
            Commands::Sync(args) => commands::sync::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
