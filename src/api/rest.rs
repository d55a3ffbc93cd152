// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Every request to `/api/v1/signal` runs a fresh invocation of the pipeline;
// no result is cached between requests.  Alerts are only sent when the
// caller asks for them with `notify=true`.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::report::SignalReport;

// =============================================================================
// Router construction
// =============================================================================

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/signal", get(signal))
        .layer(cors)
        .with_state(pipeline)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    pair: String,
    server_time: i64,
}

async fn health(State(pipeline): State<Arc<Pipeline>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        pair: pipeline.config().pair(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Signal
// =============================================================================

#[derive(Debug, Deserialize)]
struct SignalQuery {
    /// Rows of the data table; clamped to the supported range.
    #[serde(default)]
    points: Option<usize>,
    #[serde(default)]
    notify: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: &'static str,
}

async fn signal(
    State(pipeline): State<Arc<Pipeline>>,
    Query(query): Query<SignalQuery>,
) -> impl IntoResponse {
    let config = pipeline.config();
    let points = query.points.unwrap_or(config.display_points);

    match pipeline.run(query.notify).await {
        Ok(outcome) => {
            let report = SignalReport::from_outcome(&outcome, &config.pair(), config.risk_policy, points);
            Json(report).into_response()
        }
        Err(e) => {
            warn!(error = %e, "signal request produced no data");
            let status = match &e {
                PipelineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            let body = ErrorResponse {
                error: e.to_string(),
                message: "No data available.",
            };
            (status, Json(body)).into_response()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::notify::testing::RecordingNotifier;
    use crate::pipeline::testing::StaticFeed;
    use crate::runtime_config::RuntimeConfig;

    fn app(body: Option<serde_json::Value>, notifier: Arc<RecordingNotifier>) -> Router {
        let pipeline = Pipeline::new(RuntimeConfig::default(), Arc::new(StaticFeed(body)), notifier);
        router(Arc::new(pipeline))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_pair() {
        let (status, body) = get_json(app(None, Arc::default()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["pair"], "EUR/USD");
    }

    #[tokio::test]
    async fn signal_returns_report_without_alert_by_default() {
        let notifier = Arc::new(RecordingNotifier::default());
        let app = app(Some(json!({ "rates": { "USD": 1.10 } })), notifier.clone());

        let (status, body) = get_json(app, "/api/v1/signal?points=25").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendation"], "SELL");
        assert_eq!(body["rows"].as_array().map(Vec::len), Some(25));
        assert_eq!(body["series_len"], 100);
        assert_eq!(body["dispatch"]["status"], "skipped");
        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn signal_with_notify_sends_alert() {
        let notifier = Arc::new(RecordingNotifier::default());
        let app = app(Some(json!({ "rates": { "USD": 1.10 } })), notifier.clone());

        let (status, body) = get_json(app, "/api/v1/signal?notify=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dispatch"]["status"], "sent");
        assert_eq!(notifier.sent_count(), 1);
    }

    #[tokio::test]
    async fn retrieval_failure_is_bad_gateway() {
        let (status, body) = get_json(app(None, Arc::default()), "/api/v1/signal").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["message"], "No data available.");
    }
}
