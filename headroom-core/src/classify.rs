//! Trend and upside-room classification of the latest bar.
//!
//! Two independent labels are derived from the close and its indicator
//! snapshot:
//! - **Trend**: Bullish iff close > SMA, otherwise Bearish.
//! - **Opportunity**: how much room remains below the rolling high.
//!   Checked in order AtHighs → RoomAvailable → NearResistance, so exactly
//!   one applies to every input.

use crate::indicators::IndicatorSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    pub fn is_bullish(self) -> bool {
        matches!(self, Trend::Bullish)
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opportunity {
    /// Trading within a whisker of the rolling high: open sky above.
    AtHighs,
    /// The rolling high is far enough away to leave meaningful upside.
    RoomAvailable,
    /// Below the high, but too close for comfort.
    NearResistance,
}

impl std::fmt::Display for Opportunity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opportunity::AtHighs => write!(f, "at highs"),
            Opportunity::RoomAvailable => write!(f, "room available"),
            Opportunity::NearResistance => write!(f, "near resistance"),
        }
    }
}

/// Cut-offs for the opportunity category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    /// close >= high * ratio counts as trading at the highs.
    pub at_highs_ratio: f64,
    /// Minimum distance to the high, in percent, for RoomAvailable.
    pub room_pct: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            at_highs_ratio: 0.99,
            room_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub trend: Trend,
    pub opportunity: Opportunity,
    /// (high - close) / close * 100. Negative when the close sits above the
    /// recorded high; the sign is kept as is.
    pub distance_to_high_pct: f64,
}

pub fn distance_to_high_pct(close: f64, high: f64) -> f64 {
    (high - close) / close * 100.0
}

pub fn classify(
    close: f64,
    snapshot: &IndicatorSnapshot,
    thresholds: &ClassifierThresholds,
) -> Classification {
    let trend = if close > snapshot.sma_200 {
        Trend::Bullish
    } else {
        Trend::Bearish
    };

    let distance = distance_to_high_pct(close, snapshot.high_52w);

    let opportunity = if close >= snapshot.high_52w * thresholds.at_highs_ratio {
        Opportunity::AtHighs
    } else if distance >= thresholds.room_pct {
        Opportunity::RoomAvailable
    } else {
        Opportunity::NearResistance
    };

    Classification {
        trend,
        opportunity,
        distance_to_high_pct: distance,
    }
}
