//! Fear & Greed index client (alternative.me).
//!
//! The API reports values and Unix timestamps as strings:
//!
//! ```json
//! {"data":[{"value":"72","value_classification":"Greed","timestamp":"1700006400"}]}
//! ```

use async_trait::async_trait;
use chrono::DateTime;
use sage_core::error::DataError;
use sage_core::traits::{SentimentFeed, SentimentSample};
use serde::Deserialize;
use std::time::Duration;

use crate::retry::with_retry;

const DEFAULT_BASE_URL: &str = "https://api.alternative.me/fng/";
const RETRY_ATTEMPTS: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

pub struct FearGreedClient {
    http: reqwest::Client,
    base_url: String,
}

impl FearGreedClient {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, DataError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    async fn fetch_raw(&self, limit: usize) -> Result<FngResponse, DataError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("limit", limit.to_string()), ("format", "json".to_string())])
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?
            .error_for_status()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))
    }
}

fn parse_entry(entry: &FngEntry) -> Result<SentimentSample, DataError> {
    let score: u32 = entry
        .value
        .parse()
        .map_err(|_| DataError::ParseError(format!("bad index value: {}", entry.value)))?;
    let secs: i64 = entry
        .timestamp
        .parse()
        .map_err(|_| DataError::ParseError(format!("bad timestamp: {}", entry.timestamp)))?;
    let timestamp = DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DataError::ParseError(format!("timestamp out of range: {secs}")))?;

    Ok(SentimentSample {
        timestamp,
        score,
        classification: entry.value_classification.clone(),
    })
}

#[async_trait]
impl SentimentFeed for FearGreedClient {
    async fn fetch(&self, limit: usize) -> Result<Vec<SentimentSample>, DataError> {
        let response =
            with_retry(RETRY_ATTEMPTS, RETRY_BASE_DELAY, || self.fetch_raw(limit)).await?;

        response.data.iter().map(parse_entry).collect()
    }

    fn name(&self) -> &str {
        "fear_greed"
    }
}
