// =============================================================================
// Runtime Configuration — provider, notification and display settings
// =============================================================================
//
// Non-secret settings live in a JSON file.  Every field carries a serde
// default so a partial (or empty) file still loads.  Credentials never touch
// the file: they come from the environment via `Secrets` and are checked
// before any network call is made.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::indicators::MAX_WINDOW;
use crate::risk::RiskPolicy;

/// Bounds of the "number of points to display" parameter.
pub const MIN_DISPLAY_POINTS: usize = 10;
pub const MAX_DISPLAY_POINTS: usize = 200;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_quote_currency() -> String {
    "USD".to_string()
}

fn default_interval() -> String {
    "1day".to_string()
}

fn default_output_size() -> usize {
    100
}

fn default_synthetic_length() -> usize {
    100
}

fn default_display_points() -> usize {
    100
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// PriceSourceKind
// =============================================================================

/// Which response shape the configured provider speaks.
///
/// Chosen up front by configuration; the normalizer never guesses the shape
/// from the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSourceKind {
    /// `{"rates": {"USD": 1.08}}` — one current rate, replicated into a
    /// synthetic series.
    LatestRate,
    /// `{"values": [{"datetime": .., "close": ..}, ..]}` — dated records.
    TimeSeries,
}

impl Default for PriceSourceKind {
    fn default() -> Self {
        Self::LatestRate
    }
}

impl PriceSourceKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::LatestRate => "https://api.exchangerate.host",
            Self::TimeSeries => "https://api.twelvedata.com",
        }
    }
}

impl std::fmt::Display for PriceSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LatestRate => write!(f, "latest_rate"),
            Self::TimeSeries => write!(f, "time_series"),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Price source -------------------------------------------------------

    #[serde(default)]
    pub price_source: PriceSourceKind,

    /// Overrides the provider's default endpoint root.
    #[serde(default)]
    pub provider_url: Option<String>,

    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,

    /// Bar interval requested from a time-series provider.
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Number of dated records requested from a time-series provider.
    #[serde(default = "default_output_size")]
    pub output_size: usize,

    /// Length of the series built from a single current rate.
    #[serde(default = "default_synthetic_length")]
    pub synthetic_length: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Decision -------------------------------------------------------------

    #[serde(default)]
    pub risk_policy: RiskPolicy,

    // --- Notification --------------------------------------------------------

    #[serde(default = "default_true")]
    pub notifications_enabled: bool,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    // --- Presentation --------------------------------------------------------

    /// Rows of the data table shown in reports. Never affects indicators.
    #[serde(default = "default_display_points")]
    pub display_points: usize,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            price_source: PriceSourceKind::default(),
            provider_url: None,
            base_currency: default_base_currency(),
            quote_currency: default_quote_currency(),
            interval: default_interval(),
            output_size: default_output_size(),
            synthetic_length: default_synthetic_length(),
            request_timeout_secs: default_request_timeout_secs(),
            risk_policy: RiskPolicy::default(),
            notifications_enabled: true,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            display_points: default_display_points(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            price_source = %config.price_source,
            pair = %config.pair(),
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.base_currency.trim().is_empty() || self.quote_currency.trim().is_empty() {
            return Err(PipelineError::Config(
                "base_currency and quote_currency must be set".into(),
            ));
        }
        if self.synthetic_length < MAX_WINDOW {
            return Err(PipelineError::Config(format!(
                "synthetic_length must be >= {MAX_WINDOW}, got {}",
                self.synthetic_length
            )));
        }
        if self.output_size == 0 {
            return Err(PipelineError::Config("output_size must be > 0".into()));
        }
        if self.smtp_port == 0 {
            return Err(PipelineError::Config("smtp_port must be non-zero".into()));
        }
        if !(MIN_DISPLAY_POINTS..=MAX_DISPLAY_POINTS).contains(&self.display_points) {
            return Err(PipelineError::Config(format!(
                "display_points must be within {MIN_DISPLAY_POINTS}..={MAX_DISPLAY_POINTS}, got {}",
                self.display_points
            )));
        }
        Ok(())
    }

    /// Currency pair label, e.g. `EUR/USD`.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.base_currency, self.quote_currency)
    }

    pub fn base_url(&self) -> &str {
        self.provider_url
            .as_deref()
            .unwrap_or_else(|| self.price_source.default_base_url())
    }
}

/// Clamp a requested display window into the supported range.
pub fn clamp_display_points(points: usize) -> usize {
    points.clamp(MIN_DISPLAY_POINTS, MAX_DISPLAY_POINTS)
}

// =============================================================================
// Secrets
// =============================================================================

/// Environment keys that must be present before the pipeline may start.
pub const REQUIRED_ENV_KEYS: [&str; 4] =
    ["API_KEY", "EMAIL_USERNAME", "EMAIL_PASSWORD", "EMAIL_RECIPIENT"];

/// Credentials for the price provider and the mail relay.
///
/// Never logged or serialised; the `Debug` impl redacts every field except
/// the recipient address.
#[derive(Clone)]
pub struct Secrets {
    pub api_key: String,
    pub email_username: String,
    pub email_password: String,
    pub email_recipient: String,
}

impl Secrets {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup.  Blank values count as
    /// missing, and every missing key is named in the error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values: Vec<Option<String>> = REQUIRED_ENV_KEYS
            .iter()
            .map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .collect();

        let missing: Vec<&str> = REQUIRED_ENV_KEYS
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect();

        if !missing.is_empty() {
            return Err(PipelineError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            api_key: next(),
            email_username: next(),
            email_password: next(),
            email_recipient: next(),
        })
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &"<redacted>")
            .field("email_username", &"<redacted>")
            .field("email_password", &"<redacted>")
            .field("email_recipient", &self.email_recipient)
            .finish()
    }
}
