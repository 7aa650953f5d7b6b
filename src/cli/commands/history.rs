//! Trade history statistics command.

use anyhow::{Context, Result};
use sage_config::AppConfig;
use sage_core::traits::PositionStore;
use sage_engine::TradeStats;
use sage_persistence::JsonStore;

pub async fn run(config: AppConfig) -> Result<()> {
    let store = JsonStore::new(&config.data.dir).context("opening position store")?;
    let history = store.history().context("loading trade history")?;

    if history.is_empty() {
        println!("No closed trades yet.");
        return Ok(());
    }

    let stats = TradeStats::from_records(&history);
    println!("Closed trades:   {}", stats.total_trades);
    println!(
        "Win rate:        {:.1}% ({} wins / {} losses)",
        stats.win_rate_pct, stats.winning_trades, stats.losing_trades
    );
    println!("Total P&L:       {}", stats.total_pnl);
    println!("Avg win/loss:    {} / {}", stats.avg_win, stats.avg_loss);
    println!("Profit factor:   {:.2}", stats.profit_factor);
    println!(
        "Best / worst:    {} / {}",
        stats.best_trade, stats.worst_trade
    );
    println!(
        "Avg holding:     {:.1}h",
        stats.avg_holding_secs as f64 / 3600.0
    );

    println!("\nRecent trades:");
    for trade in history.iter().rev().take(10) {
        println!(
            "  {} {} entry {} exit {} pnl {} ({})",
            trade.closed_at.format("%Y-%m-%d %H:%M"),
            trade.direction,
            trade.entry_price,
            trade.exit_price,
            trade.pnl,
            trade.exit_reason
        );
    }

    Ok(())
}
