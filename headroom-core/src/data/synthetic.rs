//! Synthetic data provider.
//!
//! Produces a simple random walk from a starting price of 100.0, seeded by
//! the BLAKE3 hash of the symbol so every run sees the same bars. Weekends
//! are skipped. Useful for demos and for exercising the pipeline without
//! network access; the numbers mean nothing.

use super::provider::{resample_weekly, DataError, DataProvider, HistoryRequest, Interval};
use crate::domain::{Bar, PriceSeries};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    /// Bars end on `end` (inclusive).
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }

    fn generate(&self, symbol: &str, start: NaiveDate) -> Vec<Bar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;

        while current <= self.end {
            let weekday = current.weekday();
            if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar::new(current, open, high, low, close, volume));

            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, request: &HistoryRequest) -> Result<PriceSeries, DataError> {
        let start = request.period.start_from(self.end);
        let mut bars = self.generate(symbol, start);
        if request.interval == Interval::Weekly {
            bars = resample_weekly(&bars);
        }
        Ok(PriceSeries::new(symbol, bars)?)
    }
}
