//! Screener configuration.
//!
//! One immutable value describes a whole run: account settings, the
//! watchlist, how much history to request, the FX pair and its fallback,
//! commentary settings and classification thresholds. It is loaded from a
//! TOML file (every section optional), then overridden by CLI flags.
//!
//! ```toml
//! [account]
//! initial_capital = 200000.0
//! risk_tolerance = 0.05
//! atr_multiplier = 2.0
//!
//! [[watchlist]]
//! symbol = "NVDA"
//! name = "NVIDIA Corp"
//! ```

use crate::classify::ClassifierThresholds;
use crate::data::HistoryRequest;
use crate::domain::Instrument;
use crate::sizing::AccountConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Provider symbol quoting account currency per unit of quote currency.
    pub pair: String,
    /// Used whenever the live quote is unavailable.
    pub fallback_rate: f64,
    pub account_currency: String,
    pub quote_currency: String,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            pair: "JPY=X".into(),
            fallback_rate: 150.0,
            account_currency: "JPY".into(),
            quote_currency: "USD".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentaryConfig {
    pub enabled: bool,
    pub model: String,
    /// Pause before each commentary request, in seconds.
    pub backoff_secs: f64,
    /// Length limit requested in the prompt.
    pub max_chars: usize,
    pub language: String,
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-2.0-flash-exp".into(),
            backoff_secs: 2.0,
            max_chars: 40,
            language: "English".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub account: AccountConfig,
    pub history: HistoryRequest,
    pub fx: FxConfig,
    pub commentary: CommentaryConfig,
    pub thresholds: ClassifierThresholds,
    pub watchlist: Vec<Instrument>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            account: AccountConfig::default(),
            history: HistoryRequest::default(),
            fx: FxConfig::default(),
            commentary: CommentaryConfig::default(),
            thresholds: ClassifierThresholds::default(),
            watchlist: default_watchlist(),
        }
    }
}

pub fn default_watchlist() -> Vec<Instrument> {
    vec![
        Instrument::new("NVDA", "NVIDIA Corp"),
        Instrument::new("TSLA", "Tesla Inc"),
        Instrument::new("SPY", "S&P 500 ETF"),
    ]
}

impl ScreenerConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Missing sections take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.account.validate()?;

        if self.watchlist.is_empty() {
            return Err(ConfigError::Invalid {
                field: "watchlist",
                reason: "at least one instrument is required".into(),
            });
        }
        let mut seen = HashSet::new();
        for instrument in &self.watchlist {
            if instrument.symbol.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "watchlist",
                    reason: "symbol must not be empty".into(),
                });
            }
            if !seen.insert(instrument.symbol.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "watchlist",
                    reason: format!("duplicate symbol {}", instrument.symbol),
                });
            }
        }

        if self.fx.pair.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "fx.pair",
                reason: "must not be empty".into(),
            });
        }
        if !(self.fx.fallback_rate.is_finite() && self.fx.fallback_rate > 0.0) {
            return Err(ConfigError::Invalid {
                field: "fx.fallback_rate",
                reason: format!("must be positive, got {}", self.fx.fallback_rate),
            });
        }

        if !(self.commentary.backoff_secs.is_finite() && self.commentary.backoff_secs >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "commentary.backoff_secs",
                reason: format!("must be >= 0, got {}", self.commentary.backoff_secs),
            });
        }

        let t = &self.thresholds;
        if !(t.at_highs_ratio > 0.0 && t.at_highs_ratio <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "thresholds.at_highs_ratio",
                reason: format!("must be in (0, 1], got {}", t.at_highs_ratio),
            });
        }
        if !(t.room_pct.is_finite() && t.room_pct >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "thresholds.room_pct",
                reason: format!("must be >= 0, got {}", t.room_pct),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Interval, Period};

    #[test]
    fn default_config_is_valid() {
        let config = ScreenerConfig::default();
        config.validate().unwrap();
        let symbols: Vec<&str> = config.watchlist.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(symbols, ["NVDA", "TSLA", "SPY"]);
        assert_eq!(config.history.period, Period::Years(2));
        assert_eq!(config.history.interval, Interval::Daily);
    }

    #[test]
    fn toml_roundtrip() {
        let config = ScreenerConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ScreenerConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_takes_defaults() {
        let parsed = ScreenerConfig::from_toml(
            r#"
            [account]
            initial_capital = 1000000.0

            [history]
            period = "1y"

            [[watchlist]]
            symbol = "AAPL"
            name = "Apple Inc"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.account.initial_capital, 1_000_000.0);
        assert_eq!(parsed.account.risk_tolerance, 0.05);
        assert_eq!(parsed.history.period, Period::Years(1));
        assert_eq!(parsed.history.interval, Interval::Daily);
        assert_eq!(parsed.watchlist.len(), 1);
        assert_eq!(parsed.fx.pair, "JPY=X");
    }

    #[test]
    fn bad_period_is_a_parse_error() {
        let err = ScreenerConfig::from_toml("[history]\nperiod = \"forever\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let mut config = ScreenerConfig::default();
        config.watchlist.push(Instrument::new("NVDA", "again"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "watchlist", .. })
        ));
    }

    #[test]
    fn rejects_empty_watchlist() {
        let config = ScreenerConfig {
            watchlist: vec![],
            ..ScreenerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_fallback_rate() {
        let mut config = ScreenerConfig::default();
        config.fx.fallback_rate = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "fx.fallback_rate", .. })
        ));
    }

    #[test]
    fn rejects_bad_thresholds() {
        let mut config = ScreenerConfig::default();
        config.thresholds.at_highs_ratio = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ScreenerConfig::from_file(Path::new("/nonexistent/headroom.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
