//! Indicator engine.
//!
//! Every indicator implements [`Indicator`]: a pure function from a full bar
//! history to a numeric series of the same length. Warmup positions are
//! `f64::NAN`, and a NaN input poisons every window that contains it.
//!
//! [`IndicatorFrame`] runs the four indicators a screen needs over one
//! [`PriceSeries`](crate::domain::PriceSeries) and hands out the snapshot at
//! the most recent bar.

pub mod atr;
pub mod frame;
pub mod rolling_high;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, Atr};
pub use frame::{IndicatorError, IndicatorFrame, IndicatorParams, IndicatorSnapshot};
pub use rolling_high::RollingHigh;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// Trait for indicators.
///
/// # Look-ahead guard
/// No value at bar t may depend on bar t+1 or later. Truncating the input
/// must leave every earlier output unchanged.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_200", "atr_14").
    fn name(&self) -> &str;

    /// Index of the first bar that can carry a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Trailing simple mean over `period` values, inclusive of the current one.
///
/// The first `period - 1` outputs are NaN, as is any window holding a NaN.
/// Each window is summed afresh so that an all-zero window yields exactly 0.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }
    for (offset, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[offset + period - 1] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

/// Trailing maximum over `period` values, inclusive of the current one.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }
    for (offset, window) in values.windows(period).enumerate() {
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[offset + period - 1] = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    }
    result
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_warmup_and_values() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_approx(out[2], 2.0, DEFAULT_EPSILON);
        assert_approx(out[3], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_zero_window_is_exact() {
        let out = rolling_mean(&[0.3, 0.0, 0.0, 0.0], 3);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn rolling_mean_nan_poisons_window() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_approx(out[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_max_tracks_window() {
        let out = rolling_max(&[3.0, 1.0, 2.0, 0.5], 2);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 3.0);
        assert_eq!(out[2], 2.0);
        assert_eq!(out[3], 2.0);
    }

    #[test]
    fn short_input_is_all_nan() {
        assert!(rolling_mean(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
        assert!(rolling_max(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
    }
}
