//! PriceSeries — the ordered bar history of one symbol.

use super::bar::Bar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for {symbol} is empty")]
    Empty { symbol: String },

    #[error("bars for {symbol} are out of order at {date} (previous bar {previous})")]
    OutOfOrder {
        symbol: String,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("duplicate bar for {symbol} on {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

/// Chronological, duplicate-free sequence of bars for one symbol.
///
/// Only constructible through [`PriceSeries::new`], so every series in the
/// system is non-empty and strictly ascending by date. Missing calendar days
/// are simply absent rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        for pair in bars.windows(2) {
            let (prev, curr) = (pair[0].date, pair[1].date);
            if curr == prev {
                return Err(SeriesError::DuplicateDate { symbol, date: curr });
            }
            if curr < prev {
                return Err(SeriesError::OutOfOrder {
                    symbol,
                    previous: prev,
                    date: curr,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }
}
