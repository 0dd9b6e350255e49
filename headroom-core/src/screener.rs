//! Screener — wires together providers, indicators, classification and sizing.
//!
//! One [`Screener::run`] is one on-demand trigger: the FX rate is resolved
//! once, then every watchlist ticker is fetched and analyzed in order. A
//! failure is recorded against its ticker and the run moves on; nothing
//! here aborts the whole screen.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::{classify, Classification};
use crate::commentary::{build_prompt, CommentaryError, CommentaryProvider};
use crate::config::{ConfigError, ScreenerConfig};
use crate::data::{resolve_rate, DataError, DataProvider, FxRate, RateProvider};
use crate::domain::{Instrument, PriceSeries};
use crate::indicators::{IndicatorError, IndicatorFrame, IndicatorParams, IndicatorSnapshot};
use crate::sizing::{PositionRecommendation, PositionSizer};

/// Why a ticker produced no analysis.
#[derive(Debug, Error)]
pub enum TickerError {
    #[error("data error: {0}")]
    Fetch(#[from] DataError),
    #[error("indicator error: {0}")]
    Indicators(#[from] IndicatorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// No provider, no credential, or turned off in the config.
    Disabled,
    /// Commentary is only requested for bullish tickers.
    Bearish,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommentaryOutcome {
    Skipped(SkipReason),
    Comment(String),
    Failed(#[serde(serialize_with = "error_string")] CommentaryError),
}

fn error_string<S: serde::Serializer>(e: &CommentaryError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(e)
}

impl CommentaryOutcome {
    pub fn comment(&self) -> Option<&str> {
        match self {
            CommentaryOutcome::Comment(text) => Some(text),
            _ => None,
        }
    }
}

/// Everything derived for one ticker at its latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub as_of: NaiveDate,
    pub close: f64,
    pub snapshot: IndicatorSnapshot,
    pub classification: Classification,
    pub position: PositionRecommendation,
    pub commentary: CommentaryOutcome,
}

#[derive(Debug)]
pub struct TickerReport {
    pub instrument: Instrument,
    pub outcome: Result<Analysis, TickerError>,
}

impl TickerReport {
    pub fn analysis(&self) -> Option<&Analysis> {
        self.outcome.as_ref().ok()
    }
}

/// Result of one trigger.
#[derive(Debug)]
pub struct ScreenReport {
    pub fx: FxRate,
    pub tickers: Vec<TickerReport>,
}

impl ScreenReport {
    pub fn failures(&self) -> usize {
        self.tickers.iter().filter(|t| t.outcome.is_err()).count()
    }
}

pub struct Screener<'a> {
    config: ScreenerConfig,
    params: IndicatorParams,
    sizer: PositionSizer,
    data: &'a dyn DataProvider,
    rates: &'a dyn RateProvider,
    commentary: Option<&'a dyn CommentaryProvider>,
}

impl<'a> Screener<'a> {
    /// Validates `config` up front; an invalid config never starts a run.
    pub fn new(
        config: ScreenerConfig,
        data: &'a dyn DataProvider,
        rates: &'a dyn RateProvider,
        commentary: Option<&'a dyn CommentaryProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sizer = PositionSizer::new(config.account)?;
        Ok(Self {
            config,
            params: IndicatorParams::default(),
            sizer,
            data,
            rates,
            commentary,
        })
    }

    /// Override the indicator windows. Zero-length windows are rejected.
    pub fn with_params(mut self, params: IndicatorParams) -> Result<Self, ConfigError> {
        params.validate()?;
        self.params = params;
        Ok(self)
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    pub fn run(&self) -> ScreenReport {
        let fx = resolve_rate(self.rates, &self.config.fx.pair, self.config.fx.fallback_rate);
        info!(
            provider = self.data.name(),
            tickers = self.config.watchlist.len(),
            fx = fx.rate,
            "screen started"
        );

        let tickers = self
            .config
            .watchlist
            .iter()
            .map(|instrument| {
                let outcome = self.screen_ticker(instrument, fx.rate);
                match &outcome {
                    Ok(a) => info!(
                        symbol = %instrument.symbol,
                        close = a.close,
                        trend = %a.classification.trend,
                        opportunity = %a.classification.opportunity,
                        "ticker analyzed"
                    ),
                    Err(e) => warn!(symbol = %instrument.symbol, error = %e, "ticker failed"),
                }
                TickerReport {
                    instrument: instrument.clone(),
                    outcome,
                }
            })
            .collect();

        ScreenReport { fx, tickers }
    }

    fn screen_ticker(&self, instrument: &Instrument, fx_rate: f64) -> Result<Analysis, TickerError> {
        debug!(symbol = %instrument.symbol, "fetching history");
        let series = self.data.fetch(&instrument.symbol, &self.config.history)?;
        debug!(symbol = %instrument.symbol, bars = series.len(), "history loaded");
        self.analyze(instrument, &series, fx_rate)
    }

    /// Analyze an already-loaded series. No data provider involved.
    pub fn analyze(
        &self,
        instrument: &Instrument,
        series: &PriceSeries,
        fx_rate: f64,
    ) -> Result<Analysis, TickerError> {
        let frame = IndicatorFrame::compute(series, &self.params)?;
        let snapshot = frame.latest()?;
        let last = series.last();

        let classification = classify(last.close, &snapshot, &self.config.thresholds);
        let position = self
            .sizer
            .size(last.close, snapshot.atr, fx_rate, classification.trend);
        let commentary = self.commentary_for(instrument, last.close, &snapshot, &classification);

        Ok(Analysis {
            as_of: last.date,
            close: last.close,
            snapshot,
            classification,
            position,
            commentary,
        })
    }

    fn commentary_for(
        &self,
        instrument: &Instrument,
        close: f64,
        snapshot: &IndicatorSnapshot,
        classification: &Classification,
    ) -> CommentaryOutcome {
        let settings = &self.config.commentary;
        let provider = match self.commentary {
            Some(p) if settings.enabled => p,
            _ => return CommentaryOutcome::Skipped(SkipReason::Disabled),
        };
        if !classification.trend.is_bullish() {
            return CommentaryOutcome::Skipped(SkipReason::Bearish);
        }

        if settings.backoff_secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(settings.backoff_secs));
        }

        let prompt = build_prompt(
            instrument,
            close,
            snapshot.high_52w,
            settings.max_chars,
            &settings.language,
        );
        match provider.comment(&settings.model, &prompt) {
            Ok(text) => CommentaryOutcome::Comment(text),
            Err(e) => {
                warn!(symbol = %instrument.symbol, error = %e, "commentary failed");
                CommentaryOutcome::Failed(e)
            }
        }
    }
}
