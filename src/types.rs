// =============================================================================
// Shared types used across the signal pipeline
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional opinion of a single indicator rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Vote {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Final trade decision of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Default for Recommendation {
    fn default() -> Self {
        Self::Hold
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(Recommendation::Buy.to_string(), "BUY");
        assert_eq!(Vote::Neutral.to_string(), "NEUTRAL");
        assert_eq!(serde_json::to_string(&Recommendation::Hold).unwrap(), "\"HOLD\"");
        assert_eq!(serde_json::to_string(&Vote::Sell).unwrap(), "\"SELL\"");
    }
}
