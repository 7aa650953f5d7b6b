//! In-memory bar cache.

use sage_core::types::{Bar, Timeframe};
use std::collections::HashMap;

/// Simple per-process cache keyed by symbol and timeframe.
#[derive(Default)]
pub struct BarCache {
    cache: HashMap<String, Vec<Bar>>,
}

impl BarCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn cache_key(symbol: &str, timeframe: Timeframe) -> String {
        format!("{}_{}", symbol, timeframe)
    }

    /// Get cached bars.
    pub fn get(&self, symbol: &str, timeframe: Timeframe) -> Option<&[Bar]> {
        self.cache
            .get(&Self::cache_key(symbol, timeframe))
            .map(|bars| bars.as_slice())
    }

    /// Store bars, replacing any existing entry.
    pub fn put(&mut self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) {
        self.cache.insert(Self::cache_key(symbol, timeframe), bars);
    }

    /// Clear cache for a symbol across all timeframes.
    pub fn clear(&mut self, symbol: &str) {
        let prefix = format!("{}_", symbol);
        self.cache.retain(|k, _| !k.starts_with(&prefix));
    }

    pub fn clear_all(&mut self) {
        self.cache.clear();
    }
}
