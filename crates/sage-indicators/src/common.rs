//! Shared numeric building blocks.
//!
//! All helpers keep output aligned with input and use `f64::NAN` for the
//! undefined region, so composed indicators (EMA of a warm-up-prefixed
//! series, Wilder smoothing of true range) propagate alignment for free.

use sage_core::types::Bar;

/// Exponential moving average with multiplier `2 / (period + 1)`.
///
/// Seeds with the SMA of the first full window of defined values; an
/// undefined prefix in the input shifts the seed accordingly. A NaN
/// appearing after the seed poisons the remainder of the series.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    exponential_smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// Wilder smoothing: an EMA with `alpha = 1/period`, seeded the same way.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    exponential_smooth(values, period, 1.0 / period as f64)
}

fn exponential_smooth(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    // Seed window: the first run of `period` consecutive defined values.
    let seed_start = match first_full_window(values, period) {
        Some(start) => start,
        None => return result,
    };
    let seed_end = seed_start + period;

    let seed: f64 = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = seed;

    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

fn first_full_window(values: &[f64], period: usize) -> Option<usize> {
    let mut run = 0usize;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            run = 0;
        } else {
            run += 1;
            if run == period {
                return Some(i + 1 - period);
            }
        }
    }
    None
}

/// True range series. The first element has no previous close and is
/// undefined, so Wilder seeds start from a proper true range.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];
    for i in 1..n {
        tr[i] = bars[i].true_range(Some(bars[i - 1].close));
    }
    tr
}

/// Rolling arithmetic mean. A window containing any undefined value
/// yields an undefined output.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }

    result
}

/// Rolling population standard deviation.
pub fn rolling_stddev(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let period_f64 = period as f64;
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period_f64;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f64;
        result[i] = variance.sqrt();
    }

    result
}

/// Rolling maximum over a window.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, f64::NEG_INFINITY, f64::max)
}

/// Rolling minimum over a window.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_fold(values, period, f64::INFINITY, f64::min)
}

fn rolling_fold(values: &[f64], period: usize, init: f64, f: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().copied().fold(init, f);
    }

    result
}
