// =============================================================================
// Pipeline error taxonomy
// =============================================================================
//
// Retrieval-side errors (`Retrieval`, `Api`, `NoData`) halt an invocation
// before any indicator is computed.  `InsufficientData` is never fatal: it is
// reported as a warning and the affected indicators vote NEUTRAL.  `Dispatch`
// is caught by the pipeline and recorded next to the already-computed result.
// =============================================================================

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or invalid configuration, detected before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network, HTTP status or body-parse failure talking to the price source.
    #[error("price retrieval failed: {0}")]
    Retrieval(String),

    /// The provider answered with an error payload instead of prices.
    #[error("price provider returned an error: {0}")]
    Api(String),

    /// The payload carried no resolvable closing price.
    #[error("no price data: {0}")]
    NoData(String),

    /// The series is shorter than the largest indicator window.
    #[error("insufficient data: have {have} closes, need {need}")]
    InsufficientData { have: usize, need: usize },

    /// The notification could not be delivered.
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

impl PipelineError {
    /// Errors that stop the invocation with a "no data" outcome.
    pub fn halts_pipeline(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Retrieval(_) | Self::Api(_) | Self::NoData(_)
        )
    }
}

/// Transport failures talking to the provider.  The URL is stripped because
/// it carries the access key.
impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        Self::Retrieval(format!("request failed: {}", e.without_url()))
    }
}
