//! Rolling high — highest high over a trailing window.
//!
//! With the default 250-bar window this is the 52-week high.
//! Lookback: period - 1.

use super::{rolling_max, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct RollingHigh {
    period: usize,
    name: String,
}

impl RollingHigh {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "rolling high period must be >= 1");
        Self {
            period,
            name: format!("high_{period}"),
        }
    }
}

impl Indicator for RollingHigh {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        rolling_max(&highs, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn rolling_high_3() {
        let bars = make_ohlc_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 15.0, 10.0, 14.0),
            (14.0, 14.0, 13.0, 13.5),
            (13.5, 16.0, 12.0, 15.0),
            (15.0, 15.5, 14.0, 14.5),
            (14.5, 14.8, 13.0, 14.0),
        ]);
        let result = RollingHigh::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // [2] = max(12, 15, 14) = 15
        assert_approx(result[2], 15.0, DEFAULT_EPSILON);
        assert_approx(result[3], 16.0, DEFAULT_EPSILON);
        assert_approx(result[4], 16.0, DEFAULT_EPSILON);
        // [5] = max(16, 15.5, 14.8) = 16
        assert_approx(result[5], 16.0, DEFAULT_EPSILON);
    }

    #[test]
    fn old_high_rolls_out_of_window() {
        let bars = make_ohlc_bars(&[
            (10.0, 30.0, 9.0, 11.0),
            (11.0, 12.0, 10.0, 11.0),
            (11.0, 13.0, 10.0, 12.0),
            (12.0, 12.5, 11.0, 12.0),
        ]);
        let result = RollingHigh::new(2).compute(&bars);
        assert_approx(result[1], 30.0, DEFAULT_EPSILON);
        assert_approx(result[2], 13.0, DEFAULT_EPSILON);
        assert_approx(result[3], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_high_nan_propagation() {
        let mut bars = make_ohlc_bars(&[
            (10.0, 12.0, 9.0, 11.0),
            (11.0, 15.0, 10.0, 14.0),
            (14.0, 14.0, 13.0, 13.5),
        ]);
        bars[1].high = f64::NAN;
        assert!(RollingHigh::new(3).compute(&bars)[2].is_nan());
    }

    #[test]
    fn rolling_high_lookback() {
        assert_eq!(RollingHigh::new(250).lookback(), 249);
    }
}
