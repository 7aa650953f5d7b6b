//! Market data source trait definitions.

use crate::error::DataError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;

/// Result of one bar fetch.
///
/// Only closed candles enter `bars`; the still-forming candle is dropped
/// and its close is reported separately as the latest tick price.
#[derive(Debug, Clone)]
pub struct FetchedBars {
    /// Closed candles, oldest first, strictly increasing timestamps
    pub bars: Vec<Bar>,
    /// Close of the still-open candle
    pub latest_price: f64,
}

/// Trait for historical bar sources.
///
/// Transient failures (network, rate limits) are retried with backoff by
/// the implementation; callers receive either a completed result or a
/// final error and skip the cycle on failure.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the most recent `limit` closed bars for a symbol.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<FetchedBars, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}

/// Validate that a bar sequence is strictly ordered in time.
pub fn validate_ordering(bars: &[Bar]) -> Result<(), DataError> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(DataError::OutOfOrder { index: index + 1 });
        }
    }
    Ok(())
}
