// =============================================================================
// Pipeline — one invocation from provider payload to dispatched alert
// =============================================================================
//
//   1. Fetch the raw provider body            (halts on Retrieval / Api / NoData)
//   2. Normalize it into a PriceSeries
//   3. Compute the indicator set over the full series
//   4. Vote and fuse into a recommendation
//   5. Derive stop-loss / take-profit
//   6. Compose and dispatch the alert         (failure recorded, never fatal)
//
// Every step runs sequentially and nothing survives the invocation.
// =============================================================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::indicators::IndicatorSet;
use crate::market_data::{PriceFeed, PriceSeries, SeriesNormalizer};
use crate::notify::{self, DispatchStatus, Notification, Notifier};
use crate::risk::{RiskLevels, RiskPolicy};
use crate::runtime_config::RuntimeConfig;
use crate::signals::{self, FusionResult};

/// Everything computed from one price series.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub series: PriceSeries,
    pub indicators: IndicatorSet,
    pub fusion: FusionResult,
    pub levels: RiskLevels,
    /// Non-fatal conditions worth showing to the user.
    pub warnings: Vec<String>,
}

impl Evaluation {
    pub fn latest_close(&self) -> f64 {
        self.series.latest_close()
    }

    pub fn notification(&self) -> Notification {
        Notification::compose(
            self.fusion.recommendation,
            self.latest_close(),
            &self.levels,
            &self.fusion.messages(),
        )
    }
}

/// Outcome of a full invocation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub evaluation: Evaluation,
    pub dispatch: DispatchStatus,
}

/// Indicators, fusion and risk levels for `series`.  Pure and deterministic.
pub fn evaluate(series: PriceSeries, policy: RiskPolicy) -> Evaluation {
    let mut warnings = Vec::new();

    if series.is_synthetic() {
        warnings.push(
            "series replicated from a single rate; RSI and MACD carry no information".to_string(),
        );
    }

    let indicators = IndicatorSet::compute(&series);
    if let Err(e) = indicators.check_warmup() {
        warn!(error = %e, "indicators still warming up; affected votes are NEUTRAL");
        warnings.push(e.to_string());
    }

    let fusion = signals::evaluate(series.latest_close(), &indicators.snapshot());
    let levels = RiskLevels::compute(series.latest_close(), fusion.recommendation, policy);

    Evaluation {
        series,
        indicators,
        fusion,
        levels,
        warnings,
    }
}

pub struct Pipeline {
    config: RuntimeConfig,
    normalizer: SeriesNormalizer,
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(config: RuntimeConfig, feed: Arc<dyn PriceFeed>, notifier: Arc<dyn Notifier>) -> Self {
        let normalizer = SeriesNormalizer::new(
            config.price_source,
            config.quote_currency.clone(),
            config.synthetic_length,
        );
        Self {
            config,
            normalizer,
            feed,
            notifier,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Fetch and normalize the provider's current data.
    pub async fn retrieve(&self) -> Result<PriceSeries> {
        let payload = self.feed.fetch().await?;
        let series = self.normalizer.normalize(&payload)?;
        info!(
            pair = %self.config.pair(),
            points = series.len(),
            synthetic = series.is_synthetic(),
            "price series ready"
        );
        Ok(series)
    }

    /// Run one invocation.  `notify = false` skips the alert even when
    /// notifications are enabled.
    pub async fn run(&self, notify: bool) -> Result<RunOutcome> {
        let series = self.retrieve().await?;
        let evaluation = evaluate(series, self.config.risk_policy);

        info!(
            recommendation = %evaluation.fusion.recommendation,
            votes = ?evaluation.fusion.votes(),
            latest_close = evaluation.latest_close(),
            stop_loss = evaluation.levels.stop_loss,
            take_profit = evaluation.levels.take_profit,
            "trade recommendation computed"
        );

        let dispatch = if notify && self.config.notifications_enabled {
            notify::dispatch(self.notifier.as_ref(), &evaluation.notification()).await
        } else {
            DispatchStatus::Skipped
        };

        Ok(RunOutcome {
            evaluation,
            dispatch,
        })
    }
}
