//! Data provider traits and structured error types.
//!
//! `DataProvider` abstracts over price sources (Yahoo Finance, CSV files,
//! synthetic data) so the screener can be run offline and mocked in tests.
//! `RateProvider` does the same for the FX quote used in position sizing.

use crate::domain::{Bar, PriceSeries, SeriesError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Structured error types for data operations.
///
/// Displayable as-is in the per-ticker report.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

/// How far back to request history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Months(u32),
    Years(u32),
}

impl Period {
    /// Calendar days covered, rounded up.
    pub fn approx_days(self) -> i64 {
        match self {
            Period::Days(n) => n as i64,
            Period::Months(n) => n as i64 * 31,
            Period::Years(n) => n as i64 * 366,
        }
    }

    /// Earliest date included when the history ends on `end`.
    pub fn start_from(self, end: NaiveDate) -> NaiveDate {
        end - chrono::Duration::days(self.approx_days())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{n}d"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Years(n) => write!(f, "{n}y"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("period '{s}' has no unit (use d, mo or y)"))?;
        let (count, unit) = s.split_at(split);
        let count: u32 = count
            .parse()
            .map_err(|_| format!("period '{s}' must start with a number"))?;
        if count == 0 {
            return Err(format!("period '{s}' must be at least 1"));
        }
        match unit {
            "d" => Ok(Period::Days(count)),
            "mo" => Ok(Period::Months(count)),
            "y" => Ok(Period::Years(count)),
            other => Err(format!("unknown period unit '{other}' (use d, mo or y)")),
        }
    }
}

/// Bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Weekly,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => write!(f, "1d"),
            Interval::Weekly => write!(f, "1wk"),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            other => Err(format!("unknown interval '{other}' (use 1d or 1wk)")),
        }
    }
}

/// What to fetch for each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryRequest {
    #[serde(with = "as_string")]
    pub period: Period,
    #[serde(with = "as_string")]
    pub interval: Interval,
}

impl Default for HistoryRequest {
    fn default() -> Self {
        Self {
            period: Period::Years(2),
            interval: Interval::Daily,
        }
    }
}

mod as_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr<Err = String>,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Trait for price history sources.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the bar history for one symbol, oldest bar first.
    fn fetch(&self, symbol: &str, request: &HistoryRequest) -> Result<PriceSeries, DataError>;
}

/// Trait for spot FX quotes.
pub trait RateProvider: Send + Sync {
    /// Latest conversion rate for a pair symbol (e.g. "JPY=X").
    fn latest_rate(&self, pair: &str) -> Result<f64, DataError>;
}

/// Sort bars by date and collapse same-date rows, keeping the later one.
///
/// Providers occasionally repeat the most recent session as a live row.
pub fn canonicalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Aggregate daily bars into ISO weeks, dated by the week's last session.
pub fn resample_weekly(bars: &[Bar]) -> Vec<Bar> {
    let mut out: Vec<Bar> = Vec::new();
    let mut current_week = None;
    for bar in bars {
        let week = bar.date.iso_week();
        let key = (week.year(), week.week());
        match out.last_mut() {
            Some(agg) if current_week == Some(key) => {
                agg.date = bar.date;
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                current_week = Some(key);
                out.push(bar.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            100,
        )
    }

    #[test]
    fn period_parse_and_display() {
        assert_eq!("2y".parse::<Period>().unwrap(), Period::Years(2));
        assert_eq!("6mo".parse::<Period>().unwrap(), Period::Months(6));
        assert_eq!("30d".parse::<Period>().unwrap(), Period::Days(30));
        assert_eq!(Period::Years(2).to_string(), "2y");
        assert_eq!(Period::Months(6).to_string(), "6mo");
        assert!("y".parse::<Period>().is_err());
        assert!("0y".parse::<Period>().is_err());
        assert!("12".parse::<Period>().is_err());
        assert!("3w".parse::<Period>().is_err());
    }

    #[test]
    fn interval_parse_and_display() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!(Interval::Weekly.to_string(), "1wk");
        assert!("5m".parse::<Interval>().is_err());
    }

    #[test]
    fn two_years_cover_enough_sessions() {
        // ~252 sessions per year; the window must hold the 250-bar lookback.
        assert!(Period::Years(2).approx_days() * 5 / 7 >= 500);
    }

    #[test]
    fn canonicalize_sorts_and_dedupes() {
        let bars = vec![
            bar(2024, 1, 3, 11.0),
            bar(2024, 1, 2, 10.0),
            bar(2024, 1, 3, 12.0),
        ];
        let out = canonicalize(bars);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 10.0);
        assert_eq!(out[1].close, 12.0);
    }

    #[test]
    fn weekly_resample_aggregates_ohlc() {
        // Mon 2024-01-08 .. Fri 2024-01-12, then Mon 2024-01-15
        let mut bars: Vec<Bar> = (8..=12).map(|d| bar(2024, 1, d, d as f64)).collect();
        bars.push(bar(2024, 1, 15, 20.0));
        let weekly = resample_weekly(&bars);
        assert_eq!(weekly.len(), 2);
        let w = &weekly[0];
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert_eq!(w.open, 8.0);
        assert_eq!(w.high, 13.0);
        assert_eq!(w.low, 7.0);
        assert_eq!(w.close, 12.0);
        assert_eq!(w.volume, 500);
        assert_eq!(weekly[1].close, 20.0);
    }
}
