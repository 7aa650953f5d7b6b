//! Multi-timeframe aggregator.
//!
//! Slices the base bar history into named trailing windows, runs every
//! registered indicator over each window, and assembles the per-cycle
//! [`Snapshot`]. Windows overlap in data but not in purpose; each is an
//! independent pure computation, so the whole pass is deterministic.

use std::collections::BTreeMap;

use sage_core::error::{DataError, IndicatorError};
use sage_core::traits::{validate_ordering, SentimentSample};
use sage_core::types::{Bar, Snapshot, WindowMetrics, WindowSnapshot};
use sage_indicators::{build_registry, required_bars, IndicatorDef, IndicatorParams};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One named window over the base history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSpec {
    pub name: String,
    /// Trailing bar count; `None` takes the full history
    pub bars: Option<usize>,
}

impl WindowSpec {
    pub fn trailing(name: &str, bars: usize) -> Self {
        Self {
            name: name.to_string(),
            bars: Some(bars),
        }
    }

    pub fn full(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bars: None,
        }
    }
}

/// Drives the indicator registry across the configured windows.
pub struct Aggregator {
    windows: Vec<WindowSpec>,
    registry: Vec<IndicatorDef>,
    min_window_bars: usize,
}

impl Aggregator {
    pub fn new(windows: Vec<WindowSpec>, params: &IndicatorParams) -> Self {
        let registry = build_registry(params);
        let min_window_bars = required_bars(&registry);
        Self {
            windows,
            registry,
            min_window_bars,
        }
    }

    /// Bars a window needs before every scheduled indicator is defined.
    pub fn required_bars(&self) -> usize {
        self.min_window_bars
    }

    pub fn window_names(&self) -> impl Iterator<Item = &str> {
        self.windows.iter().map(|w| w.name.as_str())
    }

    /// Run one full analysis pass over the base history.
    ///
    /// Windows with insufficient history are skipped (the snapshot is
    /// partial, not invalid). Fails only on malformed input: an empty or
    /// unordered base history.
    pub fn analyze(
        &self,
        symbol: &str,
        bars: &[Bar],
        sentiment: Option<&[SentimentSample]>,
    ) -> Result<Snapshot, DataError> {
        let last = bars.last().ok_or(DataError::NoDataAvailable)?;
        validate_ordering(bars)?;

        let mut windows = BTreeMap::new();
        for spec in &self.windows {
            // A trailing window is not ready until its full bar count has
            // accumulated; a full-history window only needs the registry
            // warm-up requirement.
            let slice = match spec.bars {
                Some(count) if bars.len() >= count => &bars[bars.len() - count..],
                Some(count) => {
                    debug!(
                        window = %spec.name,
                        bars = bars.len(),
                        required = count,
                        "window not ready, skipping"
                    );
                    continue;
                }
                None => bars,
            };

            if slice.len() < self.min_window_bars {
                debug!(
                    window = %spec.name,
                    bars = slice.len(),
                    required = self.min_window_bars,
                    "window not ready, skipping"
                );
                continue;
            }

            windows.insert(spec.name.clone(), self.compute_window(&spec.name, slice));
        }

        let sentiment =
            sentiment.and_then(|samples| super::merge_sentiment(samples, last.timestamp));

        Ok(Snapshot {
            symbol: symbol.to_string(),
            timestamp: last.timestamp,
            latest_close: last.close,
            windows,
            sentiment,
        })
    }

    fn compute_window(&self, window_name: &str, bars: &[Bar]) -> WindowSnapshot {
        let mut values = BTreeMap::new();

        for def in &self.registry {
            for output in def.compute(bars) {
                debug_assert_eq!(output.values.len(), bars.len());
                match output.latest() {
                    Some(value) if value.is_finite() => {
                        values.insert(output.name.to_string(), value);
                    }
                    Some(_) => {
                        // A non-finite value slipping past the per-indicator
                        // guards is a bug; degrade this output to undefined.
                        let error = IndicatorError::UndefinedValue {
                            indicator: output.name.to_string(),
                            window: window_name.to_string(),
                        };
                        warn!(%error, "dropping indicator from snapshot");
                    }
                    None => {
                        debug!(
                            indicator = output.name,
                            window = window_name,
                            "indicator still warming up"
                        );
                    }
                }
            }
        }

        WindowSnapshot {
            bar_count: bars.len(),
            values,
            metrics: window_metrics(bars),
        }
    }
}

/// Summary metrics over one window of bars.
pub(crate) fn window_metrics(bars: &[Bar]) -> WindowMetrics {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let first_close = closes.first().copied().unwrap_or(0.0);
    let last_close = closes.last().copied().unwrap_or(0.0);
    let min_close = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let max_close = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let count = bars.len() as f64;

    let price_change_pct = if first_close != 0.0 {
        (last_close - first_close) / first_close * 100.0
    } else {
        0.0
    };
    let price_volatility_pct = if min_close != 0.0 {
        (max_close - min_close) / min_close * 100.0
    } else {
        0.0
    };
    let price_momentum = if bars.len() > 1 {
        closes.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / count
    } else {
        0.0
    };

    WindowMetrics {
        price_change_pct,
        volume_avg: bars.iter().map(|b| b.volume).sum::<f64>() / count,
        price_volatility_pct,
        highest_price: bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
        lowest_price: bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
        avg_range: bars.iter().map(|b| b.range()).sum::<f64>() / count,
        price_momentum,
    }
}
