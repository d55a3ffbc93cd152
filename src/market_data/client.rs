// =============================================================================
// Price Feed — REST client for the configured FX provider
// =============================================================================
//
// SECURITY: the access key travels as a query parameter (both providers
// require that), so request URLs are never logged.  Only the endpoint path
// and pair appear in spans.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{PipelineError, Result};
use crate::runtime_config::{PriceSourceKind, RuntimeConfig};

/// Anything that can hand the pipeline one raw provider body.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch(&self) -> Result<serde_json::Value>;
}

/// reqwest-backed feed for the `latest_rate` and `time_series` providers.
#[derive(Clone)]
pub struct HttpPriceFeed {
    api_key: String,
    kind: PriceSourceKind,
    base_url: String,
    base_currency: String,
    quote_currency: String,
    interval: String,
    output_size: usize,
    client: reqwest::Client,
}

impl HttpPriceFeed {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &RuntimeConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {e}")))?;

        debug!(
            base_url = %config.base_url(),
            source = %config.price_source,
            "HttpPriceFeed initialised"
        );

        Ok(Self {
            api_key: api_key.into(),
            kind: config.price_source,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            base_currency: config.base_currency.clone(),
            quote_currency: config.quote_currency.clone(),
            interval: config.interval.clone(),
            output_size: config.output_size,
            client,
        })
    }

    /// Endpoint path and query parameters for the configured provider.
    fn request_parts(&self) -> (String, Vec<(&'static str, String)>) {
        match self.kind {
            PriceSourceKind::LatestRate => (
                format!("{}/latest", self.base_url),
                vec![
                    ("base", self.base_currency.clone()),
                    ("access_key", self.api_key.clone()),
                ],
            ),
            PriceSourceKind::TimeSeries => (
                format!("{}/time_series", self.base_url),
                vec![
                    ("symbol", format!("{}/{}", self.base_currency, self.quote_currency)),
                    ("interval", self.interval.clone()),
                    ("outputsize", self.output_size.to_string()),
                    ("apikey", self.api_key.clone()),
                ],
            ),
        }
    }
}

#[async_trait]
impl PriceFeed for HttpPriceFeed {
    #[instrument(skip(self), name = "price_feed::fetch", fields(source = %self.kind))]
    async fn fetch(&self) -> Result<serde_json::Value> {
        let (url, query) = self.request_parts();

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        let body = read_payload(status, &text)?;
        debug!(%status, "price payload retrieved");
        Ok(body)
    }
}

/// Longest slice of an error body quoted back in a retrieval error.
const BODY_EXCERPT_CHARS: usize = 200;

/// Status is checked before the body is parsed, so a gateway error page is
/// reported with its status rather than as malformed JSON.  Error payloads
/// with a 2xx status are left to the normalizer, which knows the provider's
/// in-band error shape.
fn read_payload(status: reqwest::StatusCode, text: &str) -> Result<serde_json::Value> {
    if !status.is_success() {
        return Err(PipelineError::Retrieval(format!(
            "provider returned HTTP {status}: {}",
            excerpt(text)
        )));
    }
    serde_json::from_str(text)
        .map_err(|e| PipelineError::Retrieval(format!("failed to parse response: {e}")))
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl std::fmt::Debug for HttpPriceFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPriceFeed")
            .field("api_key", &"<redacted>")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .finish()
    }
}
