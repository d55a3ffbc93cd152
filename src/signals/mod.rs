// =============================================================================
// Signals Module
// =============================================================================
//
// Turns the latest indicator values into per-indicator votes and a single
// BUY / SELL / HOLD recommendation.

pub mod fusion;

pub use fusion::{evaluate, FusionResult, IndicatorSignal};
