//! One-shot snapshot command.

use anyhow::{Context, Result};
use sage_analysis::Aggregator;
use sage_config::AppConfig;
use sage_core::traits::{
    MarketDataSource, PositionStore, RecommendationOracle, RecommendationRequest, SentimentFeed,
};
use sage_core::types::Timeframe;
use sage_data::{BinanceSource, CsvSource, FearGreedClient};
use sage_oracle::ChatOracle;
use sage_persistence::JsonStore;
use tracing::warn;

use crate::cli::SnapshotArgs;

pub async fn run(args: SnapshotArgs, config: AppConfig) -> Result<()> {
    let timeframe: Timeframe = config
        .exchange
        .timeframe
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let symbol = &config.exchange.symbol;

    let source: Box<dyn MarketDataSource> = match &args.data {
        Some(path) => Box::new(CsvSource::new(path).context("opening CSV data")?),
        None => Box::new(BinanceSource::new().context("building exchange client")?),
    };

    let fetched = source
        .fetch_bars(symbol, timeframe, config.exchange.limit)
        .await
        .context("fetching bars")?;

    let sentiment = if config.sentiment.enabled && !args.no_sentiment {
        match FearGreedClient::new()?.fetch(config.sentiment.history_limit).await {
            Ok(samples) => Some(samples),
            Err(e) => {
                warn!(error = %e, "sentiment fetch failed, omitting");
                None
            }
        }
    } else {
        None
    };

    let aggregator = Aggregator::new(config.windows.clone(), &config.indicators);
    let snapshot = aggregator
        .analyze(symbol, &fetched.bars, sentiment.as_deref())
        .context("computing snapshot")?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    if !args.no_oracle {
        let store = JsonStore::new(&config.data.dir)?;
        let position = store.load().unwrap_or_default();
        let history = store.history().unwrap_or_default();
        let recent_trades: Vec<_> = history.iter().rev().take(5).cloned().collect();

        let oracle = ChatOracle::new(symbol, &config.exchange.timeframe, config.oracle.clone())?;
        let request = RecommendationRequest {
            snapshot: &snapshot,
            recent_bars: &fetched.bars[fetched.bars.len().saturating_sub(24)..],
            position: position.as_ref(),
            recent_trades: &recent_trades,
        };

        match oracle.recommend(&request).await {
            Ok(signal) => println!("\nRecommendation: {}", serde_json::to_string_pretty(&signal)?),
            Err(e) => warn!(error = %e, "recommendation unavailable"),
        }
    }

    Ok(())
}
