//! Configuration validation command.

use anyhow::Result;
use sage_config::AppConfig;
use sage_core::types::Timeframe;

pub async fn run(config: AppConfig) -> Result<()> {
    // Fail fast on values the typed config cannot check on its own.
    let timeframe: Timeframe = config
        .exchange
        .timeframe
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    if config.windows.is_empty() {
        anyhow::bail!("at least one analysis window must be configured");
    }
    for window in &config.windows {
        if window.bars == Some(0) {
            anyhow::bail!("window '{}' has a zero bar count", window.name);
        }
    }

    println!("Configuration OK");
    println!("  symbol:    {}", config.exchange.symbol);
    println!("  timeframe: {timeframe}");
    println!(
        "  windows:   {}",
        config
            .windows
            .iter()
            .map(|w| match w.bars {
                Some(bars) => format!("{}({})", w.name, bars),
                None => format!("{}(full)", w.name),
            })
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("\nEffective configuration:");
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
