//! Terminal dashboard command.

use anyhow::{Context, Result};
use sage_config::AppConfig;
use sage_core::traits::PositionStore;
use sage_engine::TradeStats;
use sage_monitor::{Dashboard, DashboardState};
use sage_persistence::JsonStore;

pub async fn run(config: AppConfig) -> Result<()> {
    let store = JsonStore::new(&config.data.dir).context("opening position store")?;
    let symbol = config.exchange.symbol.clone();

    let dashboard = Dashboard::new(1000);
    dashboard.run(move || {
        let mut messages = Vec::new();
        let position = store.load().unwrap_or_else(|e| {
            messages.push(format!("position load failed: {e}"));
            None
        });
        let history = store.history().unwrap_or_else(|e| {
            messages.push(format!("history load failed: {e}"));
            Vec::new()
        });

        let stats = TradeStats::from_records(&history);
        let recent_trades = history.into_iter().rev().take(20).collect();

        DashboardState {
            symbol: symbol.clone(),
            position,
            stats,
            recent_trades,
            messages,
        }
    })?;

    Ok(())
}
