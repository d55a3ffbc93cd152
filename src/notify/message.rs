use serde::Serialize;

use crate::risk::RiskLevels;
use crate::types::Recommendation;

/// Plain-text alert for one pipeline result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn compose<S: AsRef<str>>(
        recommendation: Recommendation,
        latest_close: f64,
        levels: &RiskLevels,
        signals: &[S],
    ) -> Self {
        let subject = format!("Forex Trade Alert - {recommendation}");

        let mut body = format!(
            "Trade Signal: {recommendation}\nLatest Price: {latest_close}\nTP: {:.6}\nSL: {:.6}\n\nSignals:\n",
            levels.take_profit, levels.stop_loss
        );
        let lines: Vec<&str> = signals.iter().map(AsRef::as_ref).collect();
        body.push_str(&lines.join("\n"));

        Self { subject, body }
    }
}
