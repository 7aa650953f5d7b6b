//! Volume indicators.

use sage_core::types::Bar;

use crate::common::ema;

/// Rolling volume-weighted average price over `period` bars.
///
/// Weighted by typical price; undefined when the window's total volume is
/// zero (no trades means no meaningful price).
pub fn rolling_vwap(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let total_volume: f64 = window.iter().map(|b| b.volume).sum();
        if total_volume == 0.0 {
            continue;
        }
        let weighted: f64 = window.iter().map(|b| b.typical_price() * b.volume).sum();
        result[i] = weighted / total_volume;
    }

    result
}

/// Rolling time-weighted average price: the mean OHLC4 over `period` bars.
pub fn twap(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let sum: f64 = bars[i + 1 - period..=i].iter().map(|b| b.ohlc4()).sum();
        result[i] = sum / period as f64;
    }

    result
}

/// Money Flow Index: a volume-weighted RSI analogue on typical price.
///
/// Needs `period + 1` bars (one typical-price change per flow). Zero
/// negative flow yields 100, mirroring the RSI zero-loss guard.
pub fn mfi(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    // Signed raw money flow per bar, from the typical price direction.
    let mut positive = vec![0.0; n];
    let mut negative = vec![0.0; n];
    for i in 1..n {
        let tp = bars[i].typical_price();
        let prev_tp = bars[i - 1].typical_price();
        let raw = tp * bars[i].volume;
        if tp > prev_tp {
            positive[i] = raw;
        } else if tp < prev_tp {
            negative[i] = raw;
        }
    }

    for i in period..n {
        let pos: f64 = positive[i + 1 - period..=i].iter().sum();
        let neg: f64 = negative[i + 1 - period..=i].iter().sum();
        result[i] = if neg == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + pos / neg)
        };
    }

    result
}

/// On-Balance Volume: cumulative signed volume, anchored at zero on the
/// first bar. Defined for every input position.
pub fn obv(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 {
        return result;
    }

    let mut total = 0.0;
    result[0] = 0.0;
    for i in 1..n {
        if bars[i].close > bars[i - 1].close {
            total += bars[i].volume;
        } else if bars[i].close < bars[i - 1].close {
            total -= bars[i].volume;
        }
        result[i] = total;
    }

    result
}

/// Chaikin Money Flow over a rolling window.
///
/// The money-flow multiplier is 0 on a zero-range bar; a window with zero
/// total volume yields 0 (no accumulation either way).
pub fn chaikin_money_flow(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mfv: Vec<f64> = bars
        .iter()
        .map(|b| {
            let range = b.range();
            if range == 0.0 {
                0.0
            } else {
                ((b.close - b.low) - (b.high - b.close)) / range * b.volume
            }
        })
        .collect();

    for i in (period - 1)..n {
        let flow: f64 = mfv[i + 1 - period..=i].iter().sum();
        let volume: f64 = bars[i + 1 - period..=i].iter().map(|b| b.volume).sum();
        result[i] = if volume == 0.0 { 0.0 } else { flow / volume };
    }

    result
}

/// Force Index: close-to-close change times volume, EMA-smoothed.
pub fn force_index(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut raw = vec![f64::NAN; n];
    for i in 1..n {
        raw[i] = (bars[i].close - bars[i - 1].close) * bars[i].volume;
    }
    ema(&raw, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testutil::{assert_approx, bars_from_closes};

    #[test]
    fn test_vwap_weighted_by_volume() {
        let mut bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        bars[0].volume = 1.0;
        bars[1].volume = 1.0;
        bars[2].volume = 2.0;

        let result = rolling_vwap(&bars, 3);
        assert!(result[1].is_nan());
        // Typical price equals close here (high = close + 1, low = close - 1)
        assert_approx(result[2], (10.0 + 20.0 + 30.0 * 2.0) / 4.0);
    }

    #[test]
    fn test_vwap_zero_volume_undefined() {
        let mut bars = bars_from_closes(&[10.0, 20.0, 30.0]);
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let result = rolling_vwap(&bars, 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_obv_accumulates() {
        let bars = bars_from_closes(&[10.0, 11.0, 10.5, 10.5, 12.0]);
        let result = obv(&bars);

        assert_approx(result[0], 0.0);
        assert_approx(result[1], 1000.0); // up
        assert_approx(result[2], 0.0); // down
        assert_approx(result[3], 0.0); // flat, unchanged
        assert_approx(result[4], 1000.0); // up
    }

    #[test]
    fn test_mfi_warm_up_and_range() {
        let bars = bars_from_closes(&[10.0, 11.0, 10.0, 12.0, 11.0, 13.0, 12.0, 14.0]);
        let result = mfi(&bars, 4);

        assert!(result[..4].iter().all(|v| v.is_nan()));
        for v in result[4..].iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_mfi_all_up_is_100() {
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let result = mfi(&bars, 4);
        assert_approx(result[4], 100.0);
        assert_approx(result[5], 100.0);
    }

    #[test]
    fn test_cmf_bounded() {
        let bars = bars_from_closes(&[10.0, 11.0, 10.5, 12.0, 11.5, 13.0]);
        let result = chaikin_money_flow(&bars, 4);

        for v in result.iter().filter(|v| !v.is_nan()) {
            assert!((-1.0..=1.0).contains(v));
        }
    }

    #[test]
    fn test_force_index_sign_follows_trend() {
        let up = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = force_index(&up, 3);
        assert!(result.last().unwrap() > &0.0);

        let down = bars_from_closes(&[16.0, 15.0, 14.0, 13.0, 12.0, 11.0, 10.0]);
        let result = force_index(&down, 3);
        assert!(result.last().unwrap() < &0.0);
    }

    #[test]
    fn test_twap_flat_series() {
        let bars = bars_from_closes(&[10.0; 6]);
        let result = twap(&bars, 4);
        // OHLC4 of each bar is (10 + 11 + 9 + 10) / 4 = 10
        assert_approx(result[5], 10.0);
    }
}
