//! Technical indicator library.
//!
//! Every indicator is a pure function over an ordered slice of bars (or a
//! price column extracted from one), returning a series aligned 1:1 with
//! its input. The warm-up region, the first `lookback - 1` positions
//! where the indicator's window exceeds available history, is filled with
//! `f64::NAN` as the "undefined" sentinel. Indicators never fail on short
//! input; a window shorter than the lookback yields an all-undefined
//! series.
//!
//! Families:
//! - Volume: VWAP, TWAP, MFI, OBV, CMF, Force Index
//! - Momentum: RSI, MACD, Stochastic, Williams %R
//! - Trend: ADX/DI, SuperTrend, Parabolic SAR
//! - Volatility: ATR, Bollinger Bands
//! - Statistical: Kurtosis, Z-Score, Hurst exponent
//!
//! The [`registry`] module maps output names to compute functions and
//! lookbacks, so callers schedule indicators without knowing the families.

pub mod common;
pub mod momentum;
pub mod registry;
pub mod statistical;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use registry::{build_registry, required_bars, IndicatorDef, IndicatorParams};

/// A named indicator output series, aligned 1:1 with its source bars.
#[derive(Debug, Clone)]
pub struct IndicatorResult {
    pub name: &'static str,
    pub values: Vec<f64>,
}

impl IndicatorResult {
    pub fn new(name: &'static str, values: Vec<f64>) -> Self {
        Self { name, values }
    }

    /// The newest value, or `None` while the indicator is still warming up.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().filter(|v| !v.is_nan())
    }

    /// Number of defined (non-sentinel) values.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    pub fn is_all_undefined(&self) -> bool {
        self.defined_count() == 0
    }
}
