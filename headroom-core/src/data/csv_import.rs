//! CSV import provider for offline runs.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a header row
//! `date,open,high,low,close,volume` (volume optional). Rows must already be
//! in chronological order; the file is trimmed to the requested period,
//! counted back from its last row.

use super::provider::{resample_weekly, DataError, DataProvider, HistoryRequest, Interval};
use crate::domain::{Bar, PriceSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<u64>,
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;
        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                let row = row.map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;
                Ok(Bar::new(
                    row.date,
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.volume.unwrap_or(0),
                ))
            })
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, request: &HistoryRequest) -> Result<PriceSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut bars = Self::read_bars(&path)?;
        if let Some(last) = bars.last() {
            let start = request.period.start_from(last.date);
            bars.retain(|b| b.date > start);
        }
        if request.interval == Interval::Weekly {
            bars = resample_weekly(&bars);
        }
        debug!(%symbol, path = %path.display(), bars = bars.len(), "loaded CSV");

        Ok(PriceSeries::new(symbol, bars)?)
    }
}
