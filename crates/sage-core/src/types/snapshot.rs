//! The consolidated per-cycle analysis snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary metrics for one window of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    /// Close-to-close change over the window, percent
    pub price_change_pct: f64,
    /// Mean volume per bar
    pub volume_avg: f64,
    /// (max close - min close) / min close, percent
    pub price_volatility_pct: f64,
    /// Highest high in the window
    pub highest_price: f64,
    /// Lowest low in the window
    pub lowest_price: f64,
    /// Mean bar range (high - low)
    pub avg_range: f64,
    /// Mean close-to-close change
    pub price_momentum: f64,
}

/// The latest indicator values computed over one window.
///
/// `values` holds only defined entries; an indicator still in warm-up
/// (or degraded by a guarded computation failure) is simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    /// Number of bars in the window
    pub bar_count: usize,
    /// Latest defined value per indicator output, keyed by output name
    pub values: BTreeMap<String, f64>,
    /// Summary metrics over the window
    pub metrics: WindowMetrics,
}

/// Latest sentiment reading merged into the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    pub timestamp: DateTime<Utc>,
    /// Fear & Greed index value, 0..=100
    pub score: u32,
    /// Provider classification, e.g. "Extreme Greed"
    pub classification: String,
    /// Derived directional label, e.g. "extremely_bullish"
    pub label: String,
}

/// One analysis cycle's consolidated view of the market.
///
/// Immutable after creation; recomputed from scratch every cycle. The
/// windows map uses ordered keys so two runs over the same bars produce
/// byte-identical serializations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    /// Timestamp of the newest bar, Unix milliseconds
    pub timestamp: i64,
    /// Close of the newest bar
    pub latest_close: f64,
    /// Per-window indicator values; windows without enough history are
    /// absent rather than partially filled
    pub windows: BTreeMap<String, WindowSnapshot>,
    /// Sentiment, when a feed is available; never defaulted
    pub sentiment: Option<SentimentSnapshot>,
}

impl Snapshot {
    /// Look up a single indicator value by window and output name.
    pub fn value(&self, window: &str, indicator: &str) -> Option<f64> {
        self.windows
            .get(window)
            .and_then(|w| w.values.get(indicator))
            .copied()
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }
}
