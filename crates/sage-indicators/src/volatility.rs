//! Volatility indicators.

use sage_core::types::Bar;

use crate::common::{rolling_mean, rolling_stddev, true_range, wilder_smooth};

/// Average True Range with Wilder smoothing.
///
/// The first bar's true range has no previous close and is excluded, so
/// the smoothed series needs `period + 1` bars for its first value. ATR
/// is never negative.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(bars), period)
}

/// Bollinger Bands output series.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bollinger Bands: SMA(n) plus/minus `mult` population standard
/// deviations.
///
/// On a zero-variance (flat) window the bands collapse onto the middle
/// line; no division is involved, so flat price never produces
/// infinities.
pub fn bollinger(closes: &[f64], period: usize, mult: f64) -> BollingerSeries {
    let n = closes.len();
    let middle = rolling_mean(closes, period);
    let stddev = rolling_stddev(closes, period);

    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    for i in 0..n {
        if middle[i].is_nan() || stddev[i].is_nan() {
            continue;
        }
        upper[i] = middle[i] + mult * stddev[i];
        lower[i] = middle[i] - mult * stddev[i];
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testutil::{assert_approx, bars_from_ohlc};

    #[test]
    fn test_atr_exact_values() {
        let bars = bars_from_ohlc(&[
            (100.0, 105.0, 95.0, 102.0),  // TR undefined (no prev close)
            (102.0, 108.0, 100.0, 106.0), // TR = 8
            (106.0, 107.0, 98.0, 99.0),   // TR = 9
            (99.0, 103.0, 97.0, 101.0),   // TR = 6
            (101.0, 106.0, 100.0, 105.0), // TR = 6
        ]);
        let result = atr(&bars, 3);

        assert!(result[..3].iter().all(|v| v.is_nan()));
        // Seed: mean(8, 9, 6) = 23/3; next: (1/3)*6 + (2/3)*(23/3) = 64/9
        assert_approx(result[3], 23.0 / 3.0);
        assert_approx(result[4], 64.0 / 9.0);
    }

    #[test]
    fn test_atr_never_negative() {
        let bars = bars_from_ohlc(&[
            (10.0, 11.0, 9.0, 10.5),
            (10.5, 12.0, 10.0, 11.5),
            (11.5, 11.8, 10.2, 10.4),
            (10.4, 10.9, 9.8, 10.0),
            (10.0, 10.6, 9.5, 10.2),
            (10.2, 11.4, 10.1, 11.2),
        ]);
        for v in atr(&bars, 3).iter().filter(|v| !v.is_nan()) {
            assert!(*v >= 0.0);
        }
    }

    #[test]
    fn test_atr_short_input_all_undefined() {
        let bars = bars_from_ohlc(&[(10.0, 11.0, 9.0, 10.5), (10.5, 12.0, 10.0, 11.5)]);
        assert!(atr(&bars, 14).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_bollinger_ordering() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let series = bollinger(&closes, 20, 2.0);

        for i in 0..closes.len() {
            if series.middle[i].is_nan() {
                continue;
            }
            assert!(series.upper[i] >= series.middle[i]);
            assert!(series.middle[i] >= series.lower[i]);
        }
    }

    #[test]
    fn test_bollinger_flat_price_collapses() {
        let closes = vec![100.0; 25];
        let series = bollinger(&closes, 20, 2.0);

        let last = closes.len() - 1;
        assert_approx(series.upper[last], 100.0);
        assert_approx(series.middle[last], 100.0);
        assert_approx(series.lower[last], 100.0);
        assert!(series.upper.iter().all(|v| v.is_nan() || v.is_finite()));
    }

    #[test]
    fn test_bollinger_warm_up_length() {
        let closes = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let series = bollinger(&closes, 3, 2.0);
        assert!(series.middle[1].is_nan());
        assert!(!series.middle[2].is_nan());
    }
}
