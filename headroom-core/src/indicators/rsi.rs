//! Relative Strength Index (RSI).
//!
//! Averages gains and losses with a *simple* trailing mean (not Wilder's
//! exponential smoothing): gain = max(Δclose, 0), loss = max(-Δclose, 0),
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//! The first bar has no prior close and contributes a zero change.
//! Lookback: period - 1.
//! Edge case: avg_loss == 0 → RSI = 100.

use super::{rolling_mean, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                gains[i] = f64::NAN;
                losses[i] = f64::NAN;
            } else {
                gains[i] = change.max(0.0);
                losses[i] = (-change).max(0.0);
            }
        }
        if n > 0 && bars[0].close.is_nan() {
            gains[0] = f64::NAN;
            losses[0] = f64::NAN;
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| compute_rsi(g, l))
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_window_counts_as_no_loss() {
        let bars = make_bars(&[50.0; 6]);
        let result = Rsi::new(3).compute(&bars);
        assert_eq!(result[5], 100.0);
    }

    #[test]
    fn rsi_loss_leaving_window_returns_to_100() {
        // Single loss at index 1, gains afterwards. Once the loss leaves the
        // 3-bar window the average loss is exactly zero.
        let bars = make_bars(&[10.0, 9.7, 10.1, 10.4, 10.9, 11.3]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[3] < 100.0);
        assert_eq!(result[4], 100.0);
        assert_eq!(result[5], 100.0);
    }

    #[test]
    fn rsi_simple_average_values() {
        // Changes: 0 (first bar), +0.34, -0.25, -0.48, +0.72
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // window [0, +0.34, -0.25]
        assert_approx(result[2], 100.0 - 100.0 / (1.0 + 0.34 / 0.25), 1e-6);
        // window [+0.34, -0.25, -0.48]
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-6);
        // window [-0.25, -0.48, +0.72]
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-6);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at bar {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(3).compute(&bars);
        // Changes at 2 and 3 are NaN; windows ending 2..=5 contain one of them.
        assert!(result[2..=5].iter().all(|v| v.is_nan()));
        assert_approx(result[6], 100.0, 1e-9);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 13);
    }
}
