//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coinsage")]
#[command(author, version, about = "Model-assisted crypto market analysis and position tracking")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the periodic analysis loop
    Run(RunArgs),
    /// Compute and print one snapshot
    Snapshot(SnapshotArgs),
    /// Print trade history statistics
    History,
    /// Open the terminal dashboard
    Dashboard,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Keep state in memory only; nothing is persisted
    #[arg(long)]
    pub dry_run: bool,

    /// Stop after this many cycles (run forever by default)
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

#[derive(clap::Args)]
pub struct SnapshotArgs {
    /// Read bars from a CSV file instead of the exchange
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Skip the reasoning step; print the snapshot only
    #[arg(long)]
    pub no_oracle: bool,

    /// Skip the sentiment feed
    #[arg(long)]
    pub no_sentiment: bool,
}
