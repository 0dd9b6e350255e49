//! FX rate resolution with a silent fallback.
//!
//! A failed or nonsensical quote is never an error for the run: the
//! configured fallback rate is used instead and the substitution is only
//! logged.

use super::provider::{DataError, RateProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    pub rate: f64,
    pub source: RateSource,
}

/// A rate provider that always quotes the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedRate(pub f64);

impl RateProvider for FixedRate {
    fn latest_rate(&self, _pair: &str) -> Result<f64, DataError> {
        Ok(self.0)
    }
}

/// Ask `provider` for `pair`, substituting `fallback` on any failure.
pub fn resolve_rate(provider: &dyn RateProvider, pair: &str, fallback: f64) -> FxRate {
    match provider.latest_rate(pair) {
        Ok(rate) if rate.is_finite() && rate > 0.0 => {
            debug!(%pair, rate, "live FX rate");
            FxRate {
                rate,
                source: RateSource::Live,
            }
        }
        Ok(rate) => {
            warn!(%pair, rate, fallback, "unusable FX quote, using fallback rate");
            FxRate {
                rate: fallback,
                source: RateSource::Fallback,
            }
        }
        Err(e) => {
            warn!(%pair, error = %e, fallback, "FX fetch failed, using fallback rate");
            FxRate {
                rate: fallback,
                source: RateSource::Fallback,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRate;

    impl RateProvider for FailingRate {
        fn latest_rate(&self, pair: &str) -> Result<f64, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: pair.to_string(),
            })
        }
    }

    #[test]
    fn live_rate_is_used() {
        let fx = resolve_rate(&FixedRate(148.25), "JPY=X", 150.0);
        assert_eq!(fx.rate, 148.25);
        assert_eq!(fx.source, RateSource::Live);
    }

    #[test]
    fn failure_falls_back() {
        let fx = resolve_rate(&FailingRate, "JPY=X", 150.0);
        assert_eq!(fx.rate, 150.0);
        assert_eq!(fx.source, RateSource::Fallback);
    }

    #[test]
    fn nonsense_quotes_fall_back() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let fx = resolve_rate(&FixedRate(bad), "JPY=X", 150.0);
            assert_eq!(fx.rate, 150.0);
            assert_eq!(fx.source, RateSource::Fallback);
        }
    }

    #[test]
    fn tiny_positive_rate_is_valid() {
        let fx = resolve_rate(&FixedRate(0.0067), "USDJPY", 150.0);
        assert_eq!(fx.rate, 0.0067);
        assert_eq!(fx.source, RateSource::Live);
    }
}
