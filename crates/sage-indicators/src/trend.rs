//! Trend indicators.

use sage_core::types::Bar;

use crate::common::{true_range, wilder_smooth};
use crate::volatility::atr;

/// ADX output series.
#[derive(Debug, Clone)]
pub struct AdxSeries {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

/// Average Directional Index (Wilder).
///
/// +DM/-DM from consecutive bars, Wilder-smoothed together with the true
/// range; DI± are the smoothed ratios, DX their normalized spread, and
/// ADX a second Wilder pass over DX. The DI lines warm up after `period`
/// bars, ADX after roughly twice that.
pub fn adx(bars: &[Bar], period: usize) -> AdxSeries {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up_move = bars[i].high - bars[i - 1].high;
        let down_move = bars[i - 1].low - bars[i].low;

        plus_dm[i] = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };
    }

    let smooth_tr = wilder_smooth(&true_range(bars), period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];

    for i in 0..n {
        if smooth_tr[i].is_nan() || smooth_plus[i].is_nan() || smooth_minus[i].is_nan() {
            continue;
        }
        // Flat tape: no range, no directional movement either way.
        if smooth_tr[i] == 0.0 {
            plus_di[i] = 0.0;
            minus_di[i] = 0.0;
            dx[i] = 0.0;
            continue;
        }

        let pdi = 100.0 * smooth_plus[i] / smooth_tr[i];
        let mdi = 100.0 * smooth_minus[i] / smooth_tr[i];
        plus_di[i] = pdi;
        minus_di[i] = mdi;

        let di_sum = pdi + mdi;
        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (pdi - mdi).abs() / di_sum
        };
    }

    AdxSeries {
        adx: wilder_smooth(&dx, period),
        plus_di,
        minus_di,
    }
}

/// SuperTrend output series.
#[derive(Debug, Clone)]
pub struct SupertrendSeries {
    /// The active band: support below price in an uptrend, resistance
    /// above it in a downtrend
    pub line: Vec<f64>,
    /// +1 while trending up, -1 while trending down
    pub direction: Vec<f64>,
}

/// SuperTrend: an ATR-banded trailing stop that flips direction when the
/// close breaks through the opposing band.
///
/// Bands tighten monotonically while the trend holds (the upper band only
/// falls, the lower band only rises) and reset on a flip.
pub fn supertrend(bars: &[Bar], period: usize, multiplier: f64) -> SupertrendSeries {
    let n = bars.len();
    let mut line = vec![f64::NAN; n];
    let mut direction = vec![f64::NAN; n];

    let atr_values = atr(bars, period);
    let start = match atr_values.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => return SupertrendSeries { line, direction },
    };

    let hl2 = (bars[start].high + bars[start].low) / 2.0;
    let mut upper_band = hl2 + multiplier * atr_values[start];
    let mut lower_band = hl2 - multiplier * atr_values[start];
    let mut trending_up = true;
    line[start] = lower_band;
    direction[start] = 1.0;

    for i in (start + 1)..n {
        let hl2 = (bars[i].high + bars[i].low) / 2.0;
        let basic_upper = hl2 + multiplier * atr_values[i];
        let basic_lower = hl2 - multiplier * atr_values[i];

        let prev_close = bars[i - 1].close;
        upper_band = if prev_close <= upper_band {
            basic_upper.min(upper_band)
        } else {
            basic_upper
        };
        lower_band = if prev_close >= lower_band {
            basic_lower.max(lower_band)
        } else {
            basic_lower
        };

        if trending_up && bars[i].close < lower_band {
            trending_up = false;
        } else if !trending_up && bars[i].close > upper_band {
            trending_up = true;
        }

        line[i] = if trending_up { lower_band } else { upper_band };
        direction[i] = if trending_up { 1.0 } else { -1.0 };
    }

    SupertrendSeries { line, direction }
}

/// Parabolic SAR (Wilder's acceleration factor system).
///
/// Maintains direction, extreme point and acceleration factor; the SAR
/// trails price and jumps to the prior extreme on a reversal. Defined
/// from the second bar onward.
pub fn parabolic_sar(bars: &[Bar], af_start: f64, af_step: f64, af_max: f64) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < 2 {
        return result;
    }

    let mut is_long = bars[1].close >= bars[0].close;
    let mut af = af_start;
    let mut ep;
    let mut sar;

    if is_long {
        sar = bars[0].low;
        ep = bars[1].high;
    } else {
        sar = bars[0].high;
        ep = bars[1].low;
    }
    result[1] = sar;

    for i in 2..n {
        let mut new_sar = sar + af * (ep - sar);

        if is_long {
            // SAR may not rise above the two previous lows.
            new_sar = new_sar.min(bars[i - 1].low).min(bars[i - 2].low);

            if bars[i].low < new_sar {
                // Reversal: SAR jumps to the prior extreme.
                is_long = false;
                new_sar = ep;
                ep = bars[i].low;
                af = af_start;
            } else if bars[i].high > ep {
                ep = bars[i].high;
                af = (af + af_step).min(af_max);
            }
        } else {
            // SAR may not fall below the two previous highs.
            new_sar = new_sar.max(bars[i - 1].high).max(bars[i - 2].high);

            if bars[i].high > new_sar {
                is_long = true;
                new_sar = ep;
                ep = bars[i].high;
                af = af_start;
            } else if bars[i].low < ep {
                ep = bars[i].low;
                af = (af + af_step).min(af_max);
            }
        }

        sar = new_sar;
        result[i] = sar;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testutil::bars_from_ohlc;

    fn trending_up(n: usize, step: f64) -> Vec<Bar> {
        let data: Vec<(f64, f64, f64, f64)> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base - 1.0, base + 3.0, base - 3.0, base + 1.0)
            })
            .collect();
        bars_from_ohlc(&data)
    }

    #[test]
    fn test_adx_bounds() {
        let bars = bars_from_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        let series = adx(&bars, 3);

        for v in series.adx.iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(v), "ADX out of bounds: {v}");
        }
        for v in series.plus_di.iter().chain(series.minus_di.iter()) {
            if !v.is_nan() {
                assert!(*v >= 0.0, "DI must be non-negative, got {v}");
            }
        }
    }

    #[test]
    fn test_adx_elevated_in_strong_trend() {
        let bars = trending_up(20, 5.0);
        let series = adx(&bars, 5);
        let last = series.adx.iter().rev().find(|v| !v.is_nan()).unwrap();
        assert!(*last > 10.0, "strong trend should elevate ADX, got {last}");
    }

    #[test]
    fn test_supertrend_below_price_in_uptrend() {
        let bars = trending_up(15, 2.0);
        let series = supertrend(&bars, 3, 2.0);

        for i in 5..15 {
            if !series.line[i].is_nan() {
                assert!(series.line[i] < bars[i].close);
                assert_eq!(series.direction[i], 1.0);
            }
        }
    }

    #[test]
    fn test_supertrend_flips_on_reversal() {
        let mut data: Vec<(f64, f64, f64, f64)> = (0..10)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base - 1.0, base + 2.0, base - 2.0, base + 1.0)
            })
            .collect();
        // Sharp drop
        for i in 0..8 {
            let base = 118.0 - i as f64 * 6.0;
            data.push((base + 1.0, base + 2.0, base - 2.0, base - 1.0));
        }
        let bars = bars_from_ohlc(&data);
        let series = supertrend(&bars, 3, 2.0);

        assert!(
            series.direction.iter().any(|&d| d == -1.0),
            "sharp reversal should flip direction"
        );
    }

    #[test]
    fn test_supertrend_too_few_bars() {
        let bars = bars_from_ohlc(&[(100.0, 105.0, 95.0, 102.0)]);
        let series = supertrend(&bars, 3, 2.0);
        assert!(series.line.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_psar_below_price_in_uptrend() {
        let data: Vec<(f64, f64, f64, f64)> = (0..10)
            .map(|i| {
                let base = 100.0 + i as f64 * 3.0;
                (base, base + 2.0, base - 1.0, base + 1.5)
            })
            .collect();
        let bars = bars_from_ohlc(&data);
        let result = parabolic_sar(&bars, 0.02, 0.02, 0.20);

        for i in 2..10 {
            assert!(
                result[i] < bars[i].low,
                "SAR ({}) should trail below the low ({}) at bar {i}",
                result[i],
                bars[i].low
            );
        }
    }

    #[test]
    fn test_psar_reverses() {
        let data = [
            (100.0, 105.0, 98.0, 103.0),
            (103.0, 108.0, 101.0, 107.0),
            (107.0, 112.0, 105.0, 111.0),
            (111.0, 115.0, 109.0, 114.0),
            (114.0, 114.5, 100.0, 101.0),
            (101.0, 102.0, 95.0, 96.0),
            (96.0, 97.0, 90.0, 91.0),
        ];
        let bars = bars_from_ohlc(&data);
        let result = parabolic_sar(&bars, 0.02, 0.02, 0.20);

        let mut was_below = false;
        let mut flipped_above = false;
        for i in 1..bars.len() {
            if result[i] < bars[i].close {
                was_below = true;
            }
            if was_below && result[i] > bars[i].close {
                flipped_above = true;
            }
        }
        assert!(flipped_above, "SAR should flip above price after the reversal");
    }

    #[test]
    fn test_psar_too_few_bars() {
        let bars = bars_from_ohlc(&[(100.0, 105.0, 95.0, 102.0)]);
        assert!(parabolic_sar(&bars, 0.02, 0.02, 0.20)
            .iter()
            .all(|v| v.is_nan()));
    }
}
