// =============================================================================
// Series Normalizer — provider payload to PriceSeries
// =============================================================================
//
// Two provider shapes are supported, selected by configuration:
//
//   latest_rate  { "success": true, "timestamp": 1704067200,
//                  "rates": { "USD": 1.0823, ... } }
//   time_series  { "status": "ok",
//                  "values": [ { "datetime": "2024-01-02", "close": "1.09" }, ... ] }
//
// Providers report failures in-band, so error payloads are recognised before
// any price is read.  Numeric fields may be JSON strings or numbers.
// =============================================================================

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::market_data::series::{PricePoint, PriceSeries};
use crate::runtime_config::PriceSourceKind;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LatestRateResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    rates: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    error: Option<LatestRateError>,
}

#[derive(Debug, Deserialize)]
struct LatestRateError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    info: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<RawBar>>,
}

#[derive(Debug, Deserialize)]
struct RawBar {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    close: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Converts a raw provider body into a [`PriceSeries`].
#[derive(Debug, Clone)]
pub struct SeriesNormalizer {
    kind: PriceSourceKind,
    quote_currency: String,
    synthetic_length: usize,
}

impl SeriesNormalizer {
    pub fn new(
        kind: PriceSourceKind,
        quote_currency: impl Into<String>,
        synthetic_length: usize,
    ) -> Self {
        Self {
            kind,
            quote_currency: quote_currency.into(),
            synthetic_length,
        }
    }

    pub fn normalize(&self, payload: &serde_json::Value) -> Result<PriceSeries> {
        match self.kind {
            PriceSourceKind::LatestRate => self.normalize_latest_rate(payload),
            PriceSourceKind::TimeSeries => self.normalize_time_series(payload),
        }
    }

    fn normalize_latest_rate(&self, payload: &serde_json::Value) -> Result<PriceSeries> {
        let resp: LatestRateResponse = serde_json::from_value(payload.clone())
            .map_err(|e| PipelineError::Retrieval(format!("unexpected latest-rate body: {e}")))?;

        if let Some(err) = resp.error {
            return Err(PipelineError::Api(describe_error(
                err.code.as_ref(),
                err.kind.as_deref(),
                err.info.as_deref(),
            )));
        }
        if resp.success == Some(false) {
            return Err(PipelineError::Api("provider reported success=false".into()));
        }

        let rates = resp
            .rates
            .ok_or_else(|| PipelineError::NoData("response has no 'rates' object".into()))?;

        let rate = rates
            .get(&self.quote_currency)
            .and_then(parse_number)
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| {
                PipelineError::NoData(format!("no usable {} rate in response", self.quote_currency))
            })?;

        let timestamp = resp
            .timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        warn!(
            rate,
            length = self.synthetic_length,
            "building synthetic series from a single rate; RSI and MACD are degenerate on constant input"
        );

        PriceSeries::synthetic(rate, timestamp, self.synthetic_length)
    }

    fn normalize_time_series(&self, payload: &serde_json::Value) -> Result<PriceSeries> {
        let resp: TimeSeriesResponse = serde_json::from_value(payload.clone())
            .map_err(|e| PipelineError::Retrieval(format!("unexpected time-series body: {e}")))?;

        if resp.status.as_deref() == Some("error") {
            return Err(PipelineError::Api(describe_error(
                resp.code.as_ref(),
                None,
                resp.message.as_deref(),
            )));
        }

        let bars = resp
            .values
            .ok_or_else(|| PipelineError::NoData("response has no 'values' list".into()))?;

        let mut points = Vec::with_capacity(bars.len());
        for (idx, bar) in bars.iter().enumerate() {
            let timestamp = bar.datetime.as_deref().and_then(parse_timestamp);
            let close = bar
                .close
                .as_ref()
                .and_then(parse_number)
                .filter(|c| c.is_finite() && *c > 0.0);

            match (timestamp, close) {
                (Some(timestamp), Some(close)) => points.push(PricePoint { timestamp, close }),
                _ => warn!(index = idx, datetime = ?bar.datetime, "skipping unusable price record"),
            }
        }

        if points.is_empty() {
            return Err(PipelineError::NoData(format!(
                "none of {} records carried a usable close",
                bars.len()
            )));
        }

        debug!(records = bars.len(), kept = points.len(), "time series normalized");
        PriceSeries::from_points(points)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_number(val: &serde_json::Value) -> Option<f64> {
    match val {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339, all read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn describe_error(
    code: Option<&serde_json::Value>,
    kind: Option<&str>,
    info: Option<&str>,
) -> String {
    let mut parts = Vec::new();
    if let Some(code) = code {
        parts.push(format!("code {code}"));
    }
    if let Some(kind) = kind {
        parts.push(kind.to_string());
    }
    if let Some(info) = info {
        parts.push(info.to_string());
    }
    if parts.is_empty() {
        "unspecified provider error".to_string()
    } else {
        parts.join(": ")
    }
}
