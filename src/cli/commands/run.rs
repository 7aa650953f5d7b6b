//! Periodic analysis loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use sage_analysis::Aggregator;
use sage_config::AppConfig;
use sage_core::traits::{MarketDataSource, PositionStore, SentimentFeed};
use sage_core::types::Timeframe;
use sage_data::{BinanceSource, FearGreedClient};
use sage_engine::{CycleRunner, PositionEngine};
use sage_oracle::ChatOracle;
use sage_persistence::{JsonStore, MemoryStore};
use tracing::{error, info, warn};

use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    let timeframe: Timeframe = config
        .exchange
        .timeframe
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let symbol = config.exchange.symbol.clone();

    let source = BinanceSource::new().context("building exchange client")?;
    let sentiment_feed = if config.sentiment.enabled {
        Some(FearGreedClient::new().context("building sentiment client")?)
    } else {
        None
    };
    let oracle = Arc::new(
        ChatOracle::new(&symbol, &config.exchange.timeframe, config.oracle.clone())
            .context("building oracle client")?,
    );

    let store: Arc<dyn PositionStore> = if args.dry_run {
        info!("dry run: state will not be persisted");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonStore::new(&config.data.dir).context("opening position store")?)
    };

    let initial_position = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load persisted position, starting flat");
        None
    });
    if let Some(position) = &initial_position {
        info!(direction = %position.direction, entry = %position.entry_price, "resuming open position");
    }

    let engine = PositionEngine::with_position(config.engine.clone(), initial_position);
    let aggregator = Aggregator::new(config.windows.clone(), &config.indicators);
    let mut runner = CycleRunner::new(symbol.clone(), aggregator, engine, oracle, store);

    info!(%symbol, %timeframe, "starting analyzer");
    let mut cycle_count: u64 = 0;

    loop {
        wait_for_next_boundary(timeframe, config.exchange.settle_delay_secs).await;
        cycle_count += 1;
        info!(cycle = cycle_count, "periodic check");

        let fetched = match source
            .fetch_bars(&symbol, timeframe, config.exchange.limit)
            .await
        {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(error = %e, "bar fetch failed, skipping this cycle");
                continue;
            }
        };

        let sentiment = match &sentiment_feed {
            Some(feed) => match feed.fetch(config.sentiment.history_limit).await {
                Ok(samples) => Some(samples),
                Err(e) => {
                    warn!(error = %e, "sentiment fetch failed, continuing without it");
                    None
                }
            },
            None => None,
        };

        match runner
            .run_cycle(&fetched.bars, fetched.latest_price, sentiment.as_deref())
            .await
        {
            Ok(report) => {
                for anomaly in &report.anomalies {
                    warn!(%anomaly, "cycle anomaly");
                }
                info!(
                    price = fetched.latest_price,
                    windows = report.snapshot.windows.len(),
                    action = %report.signal.action,
                    transition = ?report.transition,
                    "cycle complete"
                );
            }
            Err(e) => error!(error = %e, "cycle failed"),
        }

        if let Some(max) = args.max_cycles {
            if cycle_count >= max {
                info!(cycles = cycle_count, "reached cycle limit, stopping");
                return Ok(());
            }
        }
    }
}

/// Sleep until the next timeframe boundary, plus a settle delay so the
/// exchange has finalized the candle.
async fn wait_for_next_boundary(timeframe: Timeframe, settle_delay_secs: u64) {
    let interval_ms = timeframe.as_millis() as i64;
    let now_ms = Utc::now().timestamp_millis();
    let next_boundary_ms = (now_ms / interval_ms + 1) * interval_ms;
    let delay_ms = (next_boundary_ms - now_ms) as u64 + settle_delay_secs * 1000;

    info!(
        delay_secs = delay_ms / 1000,
        "waiting for the next timeframe boundary"
    );
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}
