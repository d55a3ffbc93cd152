// =============================================================================
// Risk Levels — stop-loss / take-profit around the latest close
// =============================================================================
//
// A fixed 1 % offset is applied to the latest close.  Two policies exist:
//
//   direction_aware (default)
//     BUY   SL = close * 0.99   TP = close * 1.01
//     SELL  SL = close * 1.01   TP = close * 0.99
//     HOLD  SL = TP = close
//
//   fixed_inverse
//     SL = close * 1.01, TP = close * 0.99 whatever the recommendation.
//
// Values are kept at full precision; rounding happens only when displayed.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Recommendation;

/// Fractional distance of both levels from the latest close.
pub const RISK_OFFSET: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPolicy {
    DirectionAware,
    FixedInverse,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self::DirectionAware
    }
}

impl std::fmt::Display for RiskPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectionAware => write!(f, "direction_aware"),
            Self::FixedInverse => write!(f, "fixed_inverse"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl RiskLevels {
    pub fn compute(latest_close: f64, recommendation: Recommendation, policy: RiskPolicy) -> Self {
        let below = latest_close * (1.0 - RISK_OFFSET);
        let above = latest_close * (1.0 + RISK_OFFSET);

        let (stop_loss, take_profit) = match (policy, recommendation) {
            (RiskPolicy::FixedInverse, _) => (above, below),
            (RiskPolicy::DirectionAware, Recommendation::Buy) => (below, above),
            (RiskPolicy::DirectionAware, Recommendation::Sell) => (above, below),
            (RiskPolicy::DirectionAware, Recommendation::Hold) => (latest_close, latest_close),
        };

        Self {
            stop_loss,
            take_profit,
        }
    }
}
