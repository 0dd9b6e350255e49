//! Indicator frame — the per-bar indicator columns of one price series.

use super::{Atr, Indicator, RollingHigh, Rsi, Sma};
use crate::config::ConfigError;
use crate::domain::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("insufficient data for {symbol}: {bars} bars, need at least {required}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        required: usize,
    },

    #[error("{indicator} is undefined for {symbol} on {date}")]
    Undefined {
        symbol: String,
        indicator: String,
        date: NaiveDate,
    },
}

/// Window lengths for the four screening indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_period: usize,
    pub high_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: 200,
            high_period: 250,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Bars needed before any snapshot is meaningful: the longest window.
    pub fn required_bars(&self) -> usize {
        self.sma_period
            .max(self.high_period)
            .max(self.rsi_period)
            .max(self.atr_period)
    }

    /// Every window must span at least one bar.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("indicators.sma_period", self.sma_period),
            ("indicators.high_period", self.high_period),
            ("indicators.rsi_period", self.rsi_period),
            ("indicators.atr_period", self.atr_period),
        ];
        match windows.into_iter().find(|&(_, period)| period == 0) {
            Some((field, _)) => Err(ConfigError::Invalid {
                field,
                reason: "must be at least 1".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Indicator values at a single bar.
///
/// Field names follow the default windows (200-bar SMA, 250-bar high).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub sma_200: f64,
    pub high_52w: f64,
    pub rsi: f64,
    pub atr: f64,
}

impl IndicatorSnapshot {
    fn first_undefined(&self) -> Option<&'static str> {
        [
            ("sma", self.sma_200),
            ("rolling high", self.high_52w),
            ("rsi", self.rsi),
            ("atr", self.atr),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Indicator columns aligned bar-for-bar with a [`PriceSeries`].
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    symbol: String,
    dates: Vec<NaiveDate>,
    sma: Vec<f64>,
    high: Vec<f64>,
    rsi: Vec<f64>,
    atr: Vec<f64>,
}

impl IndicatorFrame {
    /// Compute all indicators, or refuse up front if the series is too short.
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Result<Self, IndicatorError> {
        let required = params.required_bars();
        if series.len() < required {
            return Err(IndicatorError::InsufficientData {
                symbol: series.symbol().to_string(),
                bars: series.len(),
                required,
            });
        }

        let bars = series.bars();
        Ok(Self {
            symbol: series.symbol().to_string(),
            dates: bars.iter().map(|b| b.date).collect(),
            sma: Sma::new(params.sma_period).compute(bars),
            high: RollingHigh::new(params.high_period).compute(bars),
            rsi: Rsi::new(params.rsi_period).compute(bars),
            atr: Atr::new(params.atr_period).compute(bars),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Raw values at `index`; warmup positions hold NaN.
    pub fn at(&self, index: usize) -> Option<IndicatorSnapshot> {
        if index >= self.len() {
            return None;
        }
        Some(IndicatorSnapshot {
            sma_200: self.sma[index],
            high_52w: self.high[index],
            rsi: self.rsi[index],
            atr: self.atr[index],
        })
    }

    /// Snapshot at the most recent bar, with every value defined.
    pub fn latest(&self) -> Result<IndicatorSnapshot, IndicatorError> {
        let last = self.len().saturating_sub(1);
        let snapshot = self
            .at(last)
            .ok_or_else(|| IndicatorError::InsufficientData {
                symbol: self.symbol.clone(),
                bars: 0,
                required: 1,
            })?;
        match snapshot.first_undefined() {
            None => Ok(snapshot),
            Some(indicator) => Err(IndicatorError::Undefined {
                symbol: self.symbol.clone(),
                indicator: indicator.to_string(),
                date: self.dates[last],
            }),
        }
    }
}
