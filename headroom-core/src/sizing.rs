//! Fixed-fractional position sizing with an ATR stop.
//!
//! ```text
//! stop_loss        = close - atr_multiplier * ATR
//! risk_per_share   = (close - stop_loss) * fx_rate        (account currency)
//! allowable_risk   = initial_capital * risk_tolerance
//! raw_shares       = floor(allowable_risk / risk_per_share)
//! max_affordable   = floor(initial_capital / (close * fx_rate))
//! shares           = min(raw_shares, max_affordable)
//! ```
//!
//! When the two limits disagree the capital limit wins, so a
//! capital-constrained plan risks less than the allowance, never more.
//!
//! # Example
//! - Capital: ¥200,000, risk tolerance 5% (¥10,000)
//! - Close $100, ATR $2, multiplier 2x → stop at $96
//! - FX 150 → risk per share ¥600 → 16 shares by risk
//! - One share costs ¥15,000 → 13 affordable → 13 shares, capital-constrained

use crate::classify::Trend;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Account settings for one screening run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Capital in account currency.
    pub initial_capital: f64,
    /// Fraction of capital risked per position, in (0, 1].
    pub risk_tolerance: f64,
    /// Stop distance in multiples of ATR.
    pub atr_multiplier: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            initial_capital: 200_000.0,
            risk_tolerance: 0.05,
            atr_multiplier: 2.0,
        }
    }
}

impl AccountConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::Invalid {
                field: "account.initial_capital",
                reason: format!("must be a positive amount, got {}", self.initial_capital),
            });
        }
        if !(self.risk_tolerance > 0.0 && self.risk_tolerance <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "account.risk_tolerance",
                reason: format!("must be in (0, 1], got {}", self.risk_tolerance),
            });
        }
        if !(self.atr_multiplier.is_finite() && self.atr_multiplier > 0.0) {
            return Err(ConfigError::Invalid {
                field: "account.atr_multiplier",
                reason: format!("must be positive, got {}", self.atr_multiplier),
            });
        }
        Ok(())
    }

    pub fn allowable_risk(&self) -> f64 {
        self.initial_capital * self.risk_tolerance
    }
}

/// Outcome of sizing one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PositionRecommendation {
    /// Bearish trend: not an entry candidate.
    NoPosition,
    Enter(PositionPlan),
}

impl PositionRecommendation {
    pub fn plan(&self) -> Option<&PositionPlan> {
        match self {
            PositionRecommendation::NoPosition => None,
            PositionRecommendation::Enter(plan) => Some(plan),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionPlan {
    /// Stop price in quote currency.
    pub stop_loss: f64,
    pub shares: u64,
    /// Loss per share at the stop, in account currency.
    pub risk_per_share: f64,
    /// Price of one share, in account currency.
    pub cost_per_share: f64,
    pub allowable_risk: f64,
    /// Share count the risk budget alone would allow.
    pub risk_shares: u64,
    /// Share count the capital alone would allow.
    pub max_affordable: u64,
    /// True when the capital limit, not the risk budget, set the size.
    pub capital_constrained: bool,
}

impl PositionPlan {
    /// Cost of the whole position in account currency.
    pub fn position_value(&self) -> f64 {
        self.shares as f64 * self.cost_per_share
    }

    /// Loss at the stop in account currency.
    pub fn risk_exposure(&self) -> f64 {
        self.shares as f64 * self.risk_per_share
    }
}

#[derive(Debug, Clone)]
pub struct PositionSizer {
    account: AccountConfig,
}

impl PositionSizer {
    pub fn new(account: AccountConfig) -> Result<Self, ConfigError> {
        account.validate()?;
        Ok(Self { account })
    }

    pub fn account(&self) -> &AccountConfig {
        &self.account
    }

    /// Size a position; Bearish trends never get one.
    pub fn size(&self, close: f64, atr: f64, fx_rate: f64, trend: Trend) -> PositionRecommendation {
        match trend {
            Trend::Bearish => PositionRecommendation::NoPosition,
            Trend::Bullish => PositionRecommendation::Enter(self.plan(close, atr, fx_rate)),
        }
    }

    /// The sizing arithmetic, independent of trend.
    pub fn plan(&self, close: f64, atr: f64, fx_rate: f64) -> PositionPlan {
        let stop_loss = close - self.account.atr_multiplier * atr;
        let risk_per_share = (close - stop_loss) * fx_rate;
        let cost_per_share = close * fx_rate;
        let allowable_risk = self.account.allowable_risk();

        let risk_shares = floor_shares(allowable_risk, risk_per_share);
        let max_affordable = floor_shares(self.account.initial_capital, cost_per_share);

        PositionPlan {
            stop_loss,
            shares: risk_shares.min(max_affordable),
            risk_per_share,
            cost_per_share,
            allowable_risk,
            risk_shares,
            max_affordable,
            capital_constrained: max_affordable < risk_shares,
        }
    }
}

/// floor(budget / unit) as a share count, 0 unless both are positive.
///
/// The quotient can round up across an integer boundary; one step back
/// restores `shares * unit <= budget`.
fn floor_shares(budget: f64, unit: f64) -> u64 {
    if !(unit > 0.0 && unit.is_finite() && budget > 0.0) {
        return 0;
    }
    let mut shares = (budget / unit).floor() as u64;
    if shares > 0 && shares as f64 * unit > budget {
        shares -= 1;
    }
    shares
}
