//! Statistical indicators.

use crate::common::{rolling_mean, rolling_stddev};

/// Rolling Z-Score: (close - rolling mean) / rolling stddev.
///
/// A zero-variance window yields 0 (the value sits exactly on the mean)
/// rather than an infinity.
pub fn zscore(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mean = rolling_mean(closes, period);
    let stddev = rolling_stddev(closes, period);

    (0..n)
        .map(|i| {
            if mean[i].is_nan() || stddev[i].is_nan() {
                f64::NAN
            } else if stddev[i] == 0.0 {
                0.0
            } else {
                (closes[i] - mean[i]) / stddev[i]
            }
        })
        .collect()
}

/// Rolling excess kurtosis (fourth standardized moment minus 3).
///
/// Population moments over the window; a zero-variance window yields 0.
pub fn kurtosis(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let period_f64 = period as f64;
    for i in (period - 1)..n {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period_f64;
        let m2 = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f64;
        if m2 == 0.0 {
            result[i] = 0.0;
            continue;
        }
        let m4 = window.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / period_f64;
        result[i] = m4 / (m2 * m2) - 3.0;
    }

    result
}

/// Rolling Hurst exponent via rescaled-range analysis.
///
/// Per position, the trailing `window` closes are turned into log
/// returns; R/S is averaged over non-overlapping splits for each lag in
/// `2..=max_lag`, and the slope of log(R/S) against log(lag) estimates H.
/// H > 0.5 indicates persistence, H < 0.5 mean reversion. Degenerate
/// windows (too few usable returns, flat segments) yield the random-walk
/// value 0.5.
pub fn hurst(closes: &[f64], window: usize, max_lag: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if window < 3 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &closes[i + 1 - window..=i];
        result[i] = rescaled_range_estimate(slice, max_lag);
    }

    result
}

/// Single R/S Hurst estimate over one window of closes.
fn rescaled_range_estimate(closes: &[f64], max_lag: usize) -> f64 {
    let mut log_returns = Vec::with_capacity(closes.len().saturating_sub(1));
    for pair in closes.windows(2) {
        if pair[0] > 0.0 && pair[1] > 0.0 {
            log_returns.push((pair[1] / pair[0]).ln());
        }
    }

    let n = log_returns.len();
    let upper_lag = max_lag.min(n / 2);
    if n < 8 || upper_lag < 2 {
        return 0.5;
    }

    let mut log_rs = Vec::new();
    let mut log_lag = Vec::new();

    for lag in 2..=upper_lag {
        let mut rs_sum = 0.0;
        let mut splits = 0usize;

        let mut start = 0;
        while start + lag <= n {
            let sub = &log_returns[start..start + lag];
            let mean = sub.iter().sum::<f64>() / lag as f64;

            // Range of the cumulative deviation from the mean.
            let mut running = 0.0;
            let mut min_dev = f64::INFINITY;
            let mut max_dev = f64::NEG_INFINITY;
            for &v in sub {
                running += v - mean;
                min_dev = min_dev.min(running);
                max_dev = max_dev.max(running);
            }
            let range = max_dev - min_dev;

            let variance = sub.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / lag as f64;
            if variance > 0.0 {
                rs_sum += range / variance.sqrt();
                splits += 1;
            }

            start += lag;
        }

        if splits > 0 {
            let avg_rs = rs_sum / splits as f64;
            if avg_rs > 0.0 {
                log_rs.push(avg_rs.ln());
                log_lag.push((lag as f64).ln());
            }
        }
    }

    if log_rs.len() < 2 {
        return 0.5;
    }

    // log(R/S) = H * log(lag) + c; the slope is the estimate.
    let count = log_rs.len() as f64;
    let mean_x = log_lag.iter().sum::<f64>() / count;
    let mean_y = log_rs.iter().sum::<f64>() / count;

    let numerator: f64 = log_lag
        .iter()
        .zip(log_rs.iter())
        .map(|(&x, &y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denominator: f64 = log_lag.iter().map(|&x| (x - mean_x).powi(2)).sum();

    if denominator == 0.0 {
        return 0.5;
    }

    (numerator / denominator).clamp(0.0, 1.0)
}
