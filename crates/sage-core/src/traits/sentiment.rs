//! Sentiment feed trait definitions.

use crate::error::DataError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sentiment observation from the external feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSample {
    pub timestamp: DateTime<Utc>,
    /// Index value, 0..=100
    pub score: u32,
    /// Provider classification, e.g. "Extreme Fear"
    pub classification: String,
}

/// Trait for market sentiment feeds.
///
/// The feed is optional: when it is absent or failing, the snapshot
/// simply omits sentiment rather than defaulting it.
#[async_trait]
pub trait SentimentFeed: Send + Sync {
    /// Fetch the most recent `limit` sentiment samples, newest first.
    async fn fetch(&self, limit: usize) -> Result<Vec<SentimentSample>, DataError>;

    /// Get the feed name.
    fn name(&self) -> &str;
}
