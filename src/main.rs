//! coinsage CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use sage_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        sage_config::load_config(&cli.config)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", cli.config.display()))?
    } else {
        sage_config::default_config()
    };

    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    // Held for the process lifetime so file output flushes.
    let _log_guard = setup_logging(log_level, cli.json_logs, config.logging.file.as_deref());

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, config).await,
        Commands::Snapshot(args) => cli::commands::snapshot::run(args, config).await,
        Commands::History => cli::commands::history::run(config).await,
        Commands::Dashboard => cli::commands::dashboard::run(config).await,
        Commands::ValidateConfig => cli::commands::validate::run(config).await,
    }
}
