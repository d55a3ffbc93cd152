// =============================================================================
// FX Signal — Main Entry Point
// =============================================================================
//
// Default mode runs one invocation: fetch prices, compute the recommendation,
// send the alert, print the report, exit.  With `--serve` (or FX_BIND_ADDR
// set) the same pipeline is exposed over HTTP instead.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod error;
mod indicators;
mod market_data;
mod notify;
mod pipeline;
mod report;
mod risk;
mod runtime_config;
mod signals;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::market_data::HttpPriceFeed;
use crate::notify::SmtpNotifier;
use crate::pipeline::Pipeline;
use crate::report::SignalReport;
use crate::runtime_config::{RuntimeConfig, Secrets};

const DEFAULT_CONFIG_PATH: &str = "fx_signal.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("FX_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    let bind_override = std::env::var("FX_BIND_ADDR").ok();
    let serve = std::env::args().any(|a| a == "--serve") || bind_override.is_some();
    if let Some(addr) = bind_override {
        config.bind_addr = addr;
    }

    config.validate().context("invalid runtime configuration")?;

    // ── 2. Credentials (fail fast, before any network call) ─────────────
    let secrets = Secrets::from_env().context("missing credentials")?;

    info!(
        pair = %config.pair(),
        source = %config.price_source,
        risk_policy = %config.risk_policy,
        notifications = config.notifications_enabled,
        "FX signal starting"
    );

    // ── 3. Collaborators ─────────────────────────────────────────────────
    let feed = HttpPriceFeed::new(&config, secrets.api_key.clone())?;
    let notifier = SmtpNotifier::new(&config, &secrets)?;
    let pair = config.pair();
    let policy = config.risk_policy;
    let display_points = config.display_points;
    let bind_addr = config.bind_addr.clone();

    let pipeline = Arc::new(Pipeline::new(config, Arc::new(feed), Arc::new(notifier)));

    // ── 4a. HTTP surface ─────────────────────────────────────────────────
    if serve {
        let app = api::rest::router(pipeline);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
        info!(addr = %bind_addr, "API server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                warn!("Shutdown signal received, stopping gracefully");
            })
            .await
            .context("API server failed")?;
        return Ok(());
    }

    // ── 4b. One-shot invocation ──────────────────────────────────────────
    match pipeline.run(true).await {
        Ok(outcome) => {
            let report = SignalReport::from_outcome(&outcome, &pair, policy, display_points);
            print!("{report}");
        }
        Err(e) if e.halts_pipeline() => {
            error!(error = %e, "pipeline halted before computing indicators");
            println!("{e}");
            println!("No data available.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
