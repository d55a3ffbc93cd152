// =============================================================================
// Signal Report — presentation of one invocation
// =============================================================================
//
// The display window (`points`) only trims the data table.  Indicators,
// votes and risk levels always come from the full series.
// =============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::{IndicatorKind, IndicatorSnapshot};
use crate::notify::DispatchStatus;
use crate::pipeline::{Evaluation, RunOutcome};
use crate::risk::{RiskLevels, RiskPolicy};
use crate::runtime_config::clamp_display_points;
use crate::signals::IndicatorSignal;
use crate::types::Recommendation;

/// One row of the data table: a close and the indicator values at that index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub bollinger_high: Option<f64>,
    pub bollinger_low: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_20: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub id: String,
    pub generated_at: String,
    pub pair: String,
    pub synthetic: bool,
    pub series_len: usize,
    pub latest_close: f64,
    pub rows: Vec<DisplayRow>,
    pub indicators: IndicatorSnapshot,
    pub signals: Vec<IndicatorSignal>,
    pub recommendation: Recommendation,
    pub risk_policy: RiskPolicy,
    pub risk: RiskLevels,
    pub warnings: Vec<String>,
    pub dispatch: DispatchStatus,
}

impl SignalReport {
    pub fn from_outcome(outcome: &RunOutcome, pair: &str, policy: RiskPolicy, points: usize) -> Self {
        Self::build(&outcome.evaluation, pair, policy, points, outcome.dispatch.clone())
    }

    pub fn build(
        eval: &Evaluation,
        pair: &str,
        policy: RiskPolicy,
        points: usize,
        dispatch: DispatchStatus,
    ) -> Self {
        let points = clamp_display_points(points);
        let total = eval.series.len();
        let start = total.saturating_sub(points);

        let at = |kind: IndicatorKind, idx: usize| eval.indicators.series(kind).get(idx).copied().flatten();
        let rows = eval
            .series
            .tail(points)
            .iter()
            .enumerate()
            .map(|(offset, point)| {
                let idx = start + offset;
                DisplayRow {
                    timestamp: point.timestamp,
                    close: point.close,
                    rsi: at(IndicatorKind::Rsi, idx),
                    macd: at(IndicatorKind::Macd, idx),
                    bollinger_high: at(IndicatorKind::BollingerHigh, idx),
                    bollinger_low: at(IndicatorKind::BollingerLow, idx),
                    sma_20: at(IndicatorKind::Sma20, idx),
                    ema_20: at(IndicatorKind::Ema20, idx),
                }
            })
            .collect();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now().to_rfc3339(),
            pair: pair.to_string(),
            synthetic: eval.series.is_synthetic(),
            series_len: total,
            latest_close: eval.latest_close(),
            rows,
            indicators: eval.indicators.snapshot(),
            signals: eval.fusion.signals.clone(),
            recommendation: eval.fusion.recommendation,
            risk_policy: policy,
            risk: eval.levels,
            warnings: eval.warnings.clone(),
            dispatch,
        }
    }
}

/// Plain-text rendering for the terminal.
impl fmt::Display for SignalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forex Trading Signals - {}", self.pair)?;
        writeln!(f)?;
        writeln!(
            f,
            "Live Forex Data (last {} of {} points{})",
            self.rows.len(),
            self.series_len,
            if self.synthetic { ", synthetic" } else { "" }
        )?;
        writeln!(
            f,
            "{:<20} {:>10} {:>8} {:>11} {:>10} {:>10} {:>10} {:>10}",
            "timestamp", "close", "RSI", "MACD", "BB high", "BB low", "SMA 20", "EMA 20"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<20} {:>10.6} {:>8} {:>11} {:>10} {:>10} {:>10} {:>10}",
                row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                row.close,
                cell(row.rsi, 2),
                cell(row.macd, 7),
                cell(row.bollinger_high, 6),
                cell(row.bollinger_low, 6),
                cell(row.sma_20, 6),
                cell(row.ema_20, 6),
            )?;
        }

        writeln!(f, "\nTrading Signals")?;
        for signal in &self.signals {
            writeln!(f, "- {}", signal.message)?;
        }

        writeln!(f, "\nTrade Recommendation: {}", self.recommendation)?;

        writeln!(f, "\nRisk Management ({})", self.risk_policy)?;
        writeln!(f, "Stop Loss: {:.6}", self.risk.stop_loss)?;
        writeln!(f, "Take Profit: {:.6}", self.risk.take_profit)?;

        if !self.warnings.is_empty() {
            writeln!(f)?;
            for warning in &self.warnings {
                writeln!(f, "warning: {warning}")?;
            }
        }

        writeln!(f, "\n{}", self.dispatch)
    }
}

fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceSeries;
    use crate::pipeline::evaluate;
    use chrono::TimeZone;

    fn eval_of(len: usize) -> Evaluation {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        evaluate(PriceSeries::synthetic(1.2, ts, len).unwrap(), RiskPolicy::DirectionAware)
    }

    #[test]
    fn display_window_does_not_change_decision() {
        let eval = eval_of(150);
        let narrow = SignalReport::build(&eval, "EUR/USD", RiskPolicy::DirectionAware, 10, DispatchStatus::Skipped);
        let wide = SignalReport::build(&eval, "EUR/USD", RiskPolicy::DirectionAware, 200, DispatchStatus::Skipped);
        assert_eq!(narrow.rows.len(), 10);
        assert_eq!(wide.rows.len(), 150);
        assert_eq!(narrow.recommendation, wide.recommendation);
        assert_eq!(narrow.risk, wide.risk);
        assert_eq!(narrow.indicators, wide.indicators);
    }

    #[test]
    fn display_window_is_clamped() {
        let eval = eval_of(100);
        let report = SignalReport::build(&eval, "EUR/USD", RiskPolicy::DirectionAware, 3, DispatchStatus::Skipped);
        assert_eq!(report.rows.len(), 10);
    }

    #[test]
    fn rows_carry_aligned_indicator_values() {
        let eval = eval_of(30);
        let report = SignalReport::build(&eval, "EUR/USD", RiskPolicy::DirectionAware, 30, DispatchStatus::Skipped);
        assert_eq!(report.rows.len(), 30);
        assert!(report.rows[0].sma_20.is_none());
        assert_eq!(report.rows[29].sma_20, Some(1.2));
        assert_eq!(report.rows[29].rsi, Some(50.0));
    }

    #[test]
    fn text_rendering_shows_decision_and_levels() {
        let eval = eval_of(100);
        let report = SignalReport::build(&eval, "EUR/USD", RiskPolicy::DirectionAware, 10, DispatchStatus::Skipped);
        let text = report.to_string();
        assert!(text.contains("Forex Trading Signals - EUR/USD"));
        assert!(text.contains("- MACD indicates SELL"));
        assert!(text.contains("Trade Recommendation: SELL"));
        assert!(text.contains("Stop Loss: 1.212000"));
        assert!(text.contains("Take Profit: 1.188000"));
        assert!(text.contains("synthetic"));
        assert!(text.contains("Notification skipped"));
    }

    #[test]
    fn json_shape() {
        let eval = eval_of(100);
        let report = SignalReport::build(&eval, "EUR/USD", RiskPolicy::DirectionAware, 10, DispatchStatus::Skipped);
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["recommendation"], "SELL");
        assert_eq!(v["risk_policy"], "direction_aware");
        assert_eq!(v["dispatch"]["status"], "skipped");
        assert_eq!(v["signals"][1]["vote"], "SELL");
        assert_eq!(v["rows"].as_array().map(Vec::len), Some(10));
    }
}
