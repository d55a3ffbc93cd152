// =============================================================================
// Signal Fusion — per-indicator votes and the overall recommendation
// =============================================================================
//
// Rules, evaluated in this fixed order:
//   1. RSI        < 30 => BUY,  > 70 => SELL,  otherwise NEUTRAL
//   2. MACD       > 0  => BUY,  otherwise SELL (a defined MACD is never NEUTRAL)
//   3. Bollinger  close < lower => BUY,  close > upper => SELL,  otherwise NEUTRAL
//
// An indicator whose latest value is undefined votes NEUTRAL.
//
// Fusion is first-match, not majority: any BUY wins, then any SELL, then HOLD.
// =============================================================================

use serde::Serialize;

use crate::indicators::IndicatorSnapshot;
use crate::types::{Recommendation, Vote};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Which rule produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalSource {
    Rsi,
    Macd,
    Bollinger,
}

/// One rule's verdict and the line shown to the user for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSignal {
    pub source: SignalSource,
    pub vote: Vote,
    pub message: String,
}

/// Output of the fusion stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionResult {
    pub signals: Vec<IndicatorSignal>,
    pub recommendation: Recommendation,
}

impl FusionResult {
    pub fn messages(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.message.as_str()).collect()
    }

    pub fn votes(&self) -> Vec<Vote> {
        self.signals.iter().map(|s| s.vote).collect()
    }
}

// -----------------------------------------------------------------------------
// Individual rules
// -----------------------------------------------------------------------------

pub fn rsi_signal(rsi: Option<f64>) -> IndicatorSignal {
    let (vote, message) = match rsi {
        Some(v) if v < RSI_OVERSOLD => (Vote::Buy, "RSI indicates BUY"),
        Some(v) if v > RSI_OVERBOUGHT => (Vote::Sell, "RSI indicates SELL"),
        Some(_) => (Vote::Neutral, "RSI neutral"),
        None => (Vote::Neutral, "RSI unavailable (insufficient data)"),
    };
    IndicatorSignal {
        source: SignalSource::Rsi,
        vote,
        message: message.to_string(),
    }
}

pub fn macd_signal(macd: Option<f64>) -> IndicatorSignal {
    let (vote, message) = match macd {
        Some(v) if v > 0.0 => (Vote::Buy, "MACD indicates BUY"),
        // Zero (flat market) falls through to SELL.
        Some(_) => (Vote::Sell, "MACD indicates SELL"),
        None => (Vote::Neutral, "MACD unavailable (insufficient data)"),
    };
    IndicatorSignal {
        source: SignalSource::Macd,
        vote,
        message: message.to_string(),
    }
}

pub fn bollinger_signal(close: f64, upper: Option<f64>, lower: Option<f64>) -> IndicatorSignal {
    let (vote, message) = match (upper, lower) {
        (Some(_), Some(lo)) if close < lo => (Vote::Buy, "Price below Bollinger Bands: BUY"),
        (Some(hi), Some(_)) if close > hi => (Vote::Sell, "Price above Bollinger Bands: SELL"),
        (Some(_), Some(_)) => (Vote::Neutral, "Price within Bollinger Bands"),
        _ => (Vote::Neutral, "Bollinger Bands unavailable (insufficient data)"),
    };
    IndicatorSignal {
        source: SignalSource::Bollinger,
        vote,
        message: message.to_string(),
    }
}

// -----------------------------------------------------------------------------
// Fusion
// -----------------------------------------------------------------------------

/// Combine votes: any BUY => BUY, else any SELL => SELL, else HOLD.
pub fn fuse(votes: &[Vote]) -> Recommendation {
    if votes.contains(&Vote::Buy) {
        Recommendation::Buy
    } else if votes.contains(&Vote::Sell) {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

/// Run every rule against the latest close and indicator values.
pub fn evaluate(latest_close: f64, snapshot: &IndicatorSnapshot) -> FusionResult {
    let signals = vec![
        rsi_signal(snapshot.rsi),
        macd_signal(snapshot.macd),
        bollinger_signal(latest_close, snapshot.bollinger_high, snapshot.bollinger_low),
    ];
    let votes: Vec<Vote> = signals.iter().map(|s| s.vote).collect();
    let recommendation = fuse(&votes);

    FusionResult {
        signals,
        recommendation,
    }
}
