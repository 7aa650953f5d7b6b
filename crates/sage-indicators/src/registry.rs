//! Indicator registry.
//!
//! Maps output names to compute functions and lookbacks so the
//! aggregation layer can schedule every indicator over a window without
//! knowing the families. Multi-output indicators (MACD, Stochastic, ADX,
//! SuperTrend, Bollinger) register one entry producing several named
//! series from a single computation.

use sage_core::types::Bar;
use serde::{Deserialize, Serialize};

use crate::{momentum, statistical, trend, volatility, volume, IndicatorResult};

/// Tunable parameters for the full indicator roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub vwap_period: usize,
    pub twap_period: usize,
    pub mfi_period: usize,
    pub cmf_period: usize,
    pub force_index_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_k: usize,
    pub stoch_smooth: usize,
    pub stoch_d: usize,
    pub williams_period: usize,
    pub adx_period: usize,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub psar_af_start: f64,
    pub psar_af_step: f64,
    pub psar_af_max: f64,
    pub atr_period: usize,
    pub bb_period: usize,
    pub bb_std_mult: f64,
    pub kurtosis_period: usize,
    pub zscore_period: usize,
    pub hurst_window: usize,
    pub hurst_max_lag: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            vwap_period: 14,
            twap_period: 14,
            mfi_period: 14,
            cmf_period: 20,
            force_index_period: 13,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stoch_k: 14,
            stoch_smooth: 3,
            stoch_d: 3,
            williams_period: 14,
            adx_period: 14,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            psar_af_start: 0.02,
            psar_af_step: 0.02,
            psar_af_max: 0.20,
            atr_period: 14,
            bb_period: 20,
            bb_std_mult: 2.0,
            kurtosis_period: 30,
            zscore_period: 20,
            hurst_window: 100,
            hurst_max_lag: 20,
        }
    }
}

type ComputeFn = Box<dyn Fn(&[Bar]) -> Vec<IndicatorResult> + Send + Sync>;

/// One scheduled indicator: a family name, the minimum bar count for a
/// defined value on its slowest output, and the compute function.
pub struct IndicatorDef {
    pub name: &'static str,
    pub lookback: usize,
    compute: ComputeFn,
}

impl IndicatorDef {
    fn new(name: &'static str, lookback: usize, compute: ComputeFn) -> Self {
        Self {
            name,
            lookback,
            compute,
        }
    }

    /// Run the indicator over a window of bars.
    pub fn compute(&self, bars: &[Bar]) -> Vec<IndicatorResult> {
        (self.compute)(bars)
    }
}

impl std::fmt::Debug for IndicatorDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorDef")
            .field("name", &self.name)
            .field("lookback", &self.lookback)
            .finish()
    }
}

fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Build the full indicator roster from a parameter set.
pub fn build_registry(params: &IndicatorParams) -> Vec<IndicatorDef> {
    let p = params.clone();
    let mut defs = Vec::new();

    // Volume family
    {
        let n = p.vwap_period;
        defs.push(IndicatorDef::new(
            "vwap",
            n,
            Box::new(move |bars| vec![IndicatorResult::new("vwap", volume::rolling_vwap(bars, n))]),
        ));
    }
    {
        let n = p.twap_period;
        defs.push(IndicatorDef::new(
            "twap",
            n,
            Box::new(move |bars| vec![IndicatorResult::new("twap", volume::twap(bars, n))]),
        ));
    }
    {
        let n = p.mfi_period;
        defs.push(IndicatorDef::new(
            "mfi",
            n + 1,
            Box::new(move |bars| vec![IndicatorResult::new("mfi", volume::mfi(bars, n))]),
        ));
    }
    defs.push(IndicatorDef::new(
        "obv",
        1,
        Box::new(|bars| vec![IndicatorResult::new("obv", volume::obv(bars))]),
    ));
    {
        let n = p.cmf_period;
        defs.push(IndicatorDef::new(
            "cmf",
            n,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "cmf",
                    volume::chaikin_money_flow(bars, n),
                )]
            }),
        ));
    }
    {
        let n = p.force_index_period;
        defs.push(IndicatorDef::new(
            "force_index",
            n + 1,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "force_index",
                    volume::force_index(bars, n),
                )]
            }),
        ));
    }

    // Momentum family
    {
        let n = p.rsi_period;
        defs.push(IndicatorDef::new(
            "rsi",
            n + 1,
            Box::new(move |bars| vec![IndicatorResult::new("rsi", momentum::rsi(&closes(bars), n))]),
        ));
    }
    {
        let (fast, slow, signal) = (p.macd_fast, p.macd_slow, p.macd_signal);
        defs.push(IndicatorDef::new(
            "macd",
            slow + signal - 1,
            Box::new(move |bars| {
                let series = momentum::macd(&closes(bars), fast, slow, signal);
                vec![
                    IndicatorResult::new("macd_line", series.line),
                    IndicatorResult::new("macd_signal", series.signal),
                    IndicatorResult::new("macd_hist", series.histogram),
                ]
            }),
        ));
    }
    {
        let (k, smooth, d) = (p.stoch_k, p.stoch_smooth, p.stoch_d);
        defs.push(IndicatorDef::new(
            "stochastic",
            k + smooth + d - 2,
            Box::new(move |bars| {
                let series = momentum::stochastic(bars, k, smooth, d);
                vec![
                    IndicatorResult::new("stoch_k", series.k),
                    IndicatorResult::new("stoch_d", series.d),
                ]
            }),
        ));
    }
    {
        let n = p.williams_period;
        defs.push(IndicatorDef::new(
            "williams_r",
            n,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "williams_r",
                    momentum::williams_r(bars, n),
                )]
            }),
        ));
    }

    // Trend family
    {
        let n = p.adx_period;
        defs.push(IndicatorDef::new(
            "adx",
            2 * n,
            Box::new(move |bars| {
                let series = trend::adx(bars, n);
                vec![
                    IndicatorResult::new("adx", series.adx),
                    IndicatorResult::new("plus_di", series.plus_di),
                    IndicatorResult::new("minus_di", series.minus_di),
                ]
            }),
        ));
    }
    {
        let (n, mult) = (p.supertrend_period, p.supertrend_multiplier);
        defs.push(IndicatorDef::new(
            "supertrend",
            n + 1,
            Box::new(move |bars| {
                let series = trend::supertrend(bars, n, mult);
                vec![
                    IndicatorResult::new("supertrend", series.line),
                    IndicatorResult::new("supertrend_direction", series.direction),
                ]
            }),
        ));
    }
    {
        let (start, step, max) = (p.psar_af_start, p.psar_af_step, p.psar_af_max);
        defs.push(IndicatorDef::new(
            "psar",
            2,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "psar",
                    trend::parabolic_sar(bars, start, step, max),
                )]
            }),
        ));
    }

    // Volatility family
    {
        let n = p.atr_period;
        defs.push(IndicatorDef::new(
            "atr",
            n + 1,
            Box::new(move |bars| vec![IndicatorResult::new("atr", volatility::atr(bars, n))]),
        ));
    }
    {
        let (n, mult) = (p.bb_period, p.bb_std_mult);
        defs.push(IndicatorDef::new(
            "bollinger",
            n,
            Box::new(move |bars| {
                let series = volatility::bollinger(&closes(bars), n, mult);
                vec![
                    IndicatorResult::new("bb_upper", series.upper),
                    IndicatorResult::new("bb_middle", series.middle),
                    IndicatorResult::new("bb_lower", series.lower),
                ]
            }),
        ));
    }

    // Statistical family
    {
        let n = p.kurtosis_period;
        defs.push(IndicatorDef::new(
            "kurtosis",
            n,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "kurtosis",
                    statistical::kurtosis(&closes(bars), n),
                )]
            }),
        ));
    }
    {
        let n = p.zscore_period;
        defs.push(IndicatorDef::new(
            "zscore",
            n,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "zscore",
                    statistical::zscore(&closes(bars), n),
                )]
            }),
        ));
    }
    {
        let (window, max_lag) = (p.hurst_window, p.hurst_max_lag);
        defs.push(IndicatorDef::new(
            "hurst",
            window,
            Box::new(move |bars| {
                vec![IndicatorResult::new(
                    "hurst",
                    statistical::hurst(&closes(bars), window, max_lag),
                )]
            }),
        ));
    }

    defs
}

/// Bars required before every registered indicator has cleared warm-up.
/// Windows shorter than this are reported "not ready".
pub fn required_bars(defs: &[IndicatorDef]) -> usize {
    defs.iter().map(|d| d.lookback).max().unwrap_or(0)
}
