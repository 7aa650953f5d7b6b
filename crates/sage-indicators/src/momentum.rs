//! Momentum indicators.

use sage_core::types::Bar;

use crate::common::{ema, rolling_max, rolling_mean, rolling_min};

/// Relative Strength Index with Wilder smoothing.
///
/// Needs `period + 1` closes (one change per period slot). An average
/// loss of zero yields 100 rather than dividing by zero.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let period_f64 = period as f64;

    // Seed averages over the first `period` changes.
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period_f64;
    avg_loss /= period_f64;
    result[period] = rsi_from_averages(avg_gain, avg_loss);

    // Wilder recurrence for the remaining changes.
    for i in (period + 1)..n {
        let change = closes[i] - closes[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period_f64 - 1.0) + gain) / period_f64;
        avg_loss = (avg_loss * (period_f64 - 1.0) + loss) / period_f64;
        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

#[inline]
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// MACD output series, all aligned with the input closes.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    /// Fast EMA minus slow EMA
    pub line: Vec<f64>,
    /// EMA of the MACD line
    pub signal: Vec<f64>,
    /// Line minus signal
    pub histogram: Vec<f64>,
}

/// Moving Average Convergence Divergence.
///
/// Standard parameterization is (12, 26, 9). The signal EMA seeds itself
/// past the line's warm-up region, so the full stack stays aligned.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let n = closes.len();
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<f64> = (0..n)
        .map(|i| {
            if fast_ema[i].is_nan() || slow_ema[i].is_nan() {
                f64::NAN
            } else {
                fast_ema[i] - slow_ema[i]
            }
        })
        .collect();

    let signal = ema(&line, signal_period);

    let histogram: Vec<f64> = (0..n)
        .map(|i| {
            if line[i].is_nan() || signal[i].is_nan() {
                f64::NAN
            } else {
                line[i] - signal[i]
            }
        })
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

/// Stochastic oscillator output series.
#[derive(Debug, Clone)]
pub struct StochasticSeries {
    /// Smoothed %K
    pub k: Vec<f64>,
    /// %D, an SMA of %K
    pub d: Vec<f64>,
}

/// Stochastic oscillator with configurable %K smoothing.
///
/// Raw %K compares the close to the high/low range over `k_period` bars;
/// a zero range (flat window) maps to the 50 midpoint. `smooth_k` and
/// `d_period` are simple moving averages on top.
pub fn stochastic(
    bars: &[Bar],
    k_period: usize,
    smooth_k: usize,
    d_period: usize,
) -> StochasticSeries {
    let n = bars.len();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let highest = rolling_max(&highs, k_period);
    let lowest = rolling_min(&lows, k_period);

    let raw: Vec<f64> = (0..n)
        .map(|i| {
            if highest[i].is_nan() || lowest[i].is_nan() {
                return f64::NAN;
            }
            let range = highest[i] - lowest[i];
            if range == 0.0 {
                50.0
            } else {
                (bars[i].close - lowest[i]) / range * 100.0
            }
        })
        .collect();

    let k = rolling_mean(&raw, smooth_k);
    let d = rolling_mean(&k, d_period);

    StochasticSeries { k, d }
}

/// Williams %R: the inverted stochastic, in [-100, 0].
///
/// A zero range maps to the -50 midpoint.
pub fn williams_r(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let highest = rolling_max(&highs, period);
    let lowest = rolling_min(&lows, period);

    (0..n)
        .map(|i| {
            if highest[i].is_nan() || lowest[i].is_nan() {
                return f64::NAN;
            }
            let range = highest[i] - lowest[i];
            if range == 0.0 {
                -50.0
            } else {
                -100.0 * (highest[i] - bars[i].close) / range
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testutil::{assert_approx, bars_from_closes};

    #[test]
    fn test_rsi_warm_up_and_exact_values() {
        // Changes: +2, -1, +4, -2, +5
        let closes = vec![100.0, 102.0, 101.0, 105.0, 103.0, 108.0];
        let result = rsi(&closes, 4);

        assert_eq!(result.len(), 6);
        assert!(result[..4].iter().all(|v| v.is_nan()));

        // Seed: avg_gain = (2 + 4) / 4 = 1.5, avg_loss = (1 + 2) / 4 = 0.75
        // RSI = 100 - 100 / (1 + 2) = 66.666...
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + 2.0));

        // Next change +5: avg_gain = (1.5 * 3 + 5) / 4 = 2.375,
        // avg_loss = (0.75 * 3) / 4 = 0.5625, rs = 4.2222...
        let rs = 2.375 / 0.5625;
        assert_approx(result[5], 100.0 - 100.0 / (1.0 + rs));
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        for v in rsi(&closes, 14).iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let result = rsi(&closes, 5);
        assert_approx(result[5], 100.0);
        assert_approx(result[9], 100.0);
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let result = rsi(&closes, 5);
        assert_approx(result[9], 0.0);
    }

    #[test]
    fn test_rsi_short_input_all_undefined() {
        let closes = vec![100.0, 101.0, 102.0];
        assert!(rsi(&closes, 14).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_macd_alignment_and_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let series = macd(&closes, 12, 26, 9);

        assert_eq!(series.line.len(), 60);
        assert_eq!(series.signal.len(), 60);
        // Line defined from index slow - 1 = 25
        assert!(series.line[24].is_nan());
        assert!(!series.line[25].is_nan());
        // Signal defined from index slow + signal - 2 = 33
        assert!(series.signal[32].is_nan());
        assert!(!series.signal[33].is_nan());
        // Steady uptrend keeps the line positive
        assert!(series.line.last().unwrap() > &0.0);
    }

    #[test]
    fn test_stochastic_close_at_high() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let mut bars = bars_from_closes(&closes);
        // Close at the top of each bar's range
        for bar in &mut bars {
            bar.high = bar.close;
            bar.low = bar.close - 2.0;
        }

        let series = stochastic(&bars, 5, 3, 3);
        let last_k = *series.k.last().unwrap();
        assert!(last_k > 80.0, "close at highs should push %K up, got {last_k}");

        for v in series.k.iter().chain(series.d.iter()).filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_stochastic_flat_window_is_midpoint() {
        let mut bars = bars_from_closes(&[10.0; 8]);
        for bar in &mut bars {
            bar.high = 10.0;
            bar.low = 10.0;
        }
        let series = stochastic(&bars, 3, 1, 1);
        assert_approx(*series.k.last().unwrap(), 50.0);
    }

    #[test]
    fn test_williams_r_range() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i as f64 * 0.5).sin() * 4.0).collect();
        let bars = bars_from_closes(&closes);

        for v in williams_r(&bars, 7).iter().filter(|v| !v.is_nan()) {
            assert!((-100.0..=0.0).contains(v));
        }
    }
}
