//! Headroom Core — indicators, trend classification, position sizing, providers.
//!
//! This crate contains everything behind a single screening run:
//! - Domain types (bars, price series, watchlist instruments)
//! - Indicator engine (SMA, rolling high, RSI, ATR) over a full series
//! - Trend and upside-room classification of the latest bar
//! - Fixed-fractional position sizing with an ATR stop
//! - Market data, FX rate and commentary providers behind traits
//! - The watchlist screener that ties them together per ticker

pub mod classify;
pub mod commentary;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod screener;
pub mod sizing;

pub use classify::{classify, Classification, ClassifierThresholds, Opportunity, Trend};
pub use config::{ConfigError, ScreenerConfig};
pub use domain::{Bar, Instrument, PriceSeries, SeriesError};
pub use indicators::{IndicatorError, IndicatorFrame, IndicatorParams, IndicatorSnapshot};
pub use screener::{Analysis, CommentaryOutcome, ScreenReport, Screener, TickerError, TickerReport};
pub use sizing::{AccountConfig, PositionPlan, PositionRecommendation, PositionSizer};
