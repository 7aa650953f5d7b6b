//! Binance klines REST source.
//!
//! Fetches `limit + 1` candles and drops the still-forming last one: only
//! closed candles enter the history, while the open candle's close is
//! reported as the latest tick price.

use async_trait::async_trait;
use sage_core::error::DataError;
use sage_core::traits::{validate_ordering, FetchedBars, MarketDataSource};
use sage_core::types::{Bar, Timeframe};
use serde_json::Value;
use std::time::Duration;

use crate::retry::with_retry;

const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

pub struct BinanceSource {
    http: reqwest::Client,
    base_url: String,
}

impl BinanceSource {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, DataError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Vec<Value>>, DataError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", timeframe.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        if response.status().as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited { retry_after_secs });
        }

        let response = response
            .error_for_status()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))
    }
}

/// Parse one kline row: `[open_time, open, high, low, close, volume, ...]`
/// where prices arrive as strings.
fn parse_kline(row: &[Value]) -> Result<Bar, DataError> {
    if row.len() < 6 {
        return Err(DataError::ParseError(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    let timestamp = row[0]
        .as_i64()
        .ok_or_else(|| DataError::ParseError("kline open time is not an integer".to_string()))?;

    let price = |idx: usize, name: &str| -> Result<f64, DataError> {
        row[idx]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| DataError::ParseError(format!("kline {name} is not a number")))
    };

    Ok(Bar::new(
        timestamp,
        price(1, "open")?,
        price(2, "high")?,
        price(3, "low")?,
        price(4, "close")?,
        price(5, "volume")?,
    ))
}

#[async_trait]
impl MarketDataSource for BinanceSource {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<FetchedBars, DataError> {
        let rows = with_retry(RETRY_ATTEMPTS, RETRY_BASE_DELAY, || {
            self.fetch_klines(symbol, timeframe, limit + 1)
        })
        .await?;

        if rows.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        let mut bars = rows
            .iter()
            .map(|row| parse_kline(row))
            .collect::<Result<Vec<Bar>, DataError>>()?;

        // The newest candle is still forming; keep its close as the tick.
        let open_candle = bars.pop().ok_or(DataError::NoDataAvailable)?;
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        validate_ordering(&bars)?;

        Ok(FetchedBars {
            bars,
            latest_price: open_candle.close,
        })
    }

    fn name(&self) -> &str {
        "binance"
    }
}
