//! LinguaPolish server
//!
//! # Environment Variables
//!
//! - `POLISH_CONFIG`: path to a TOML configuration file
//! - `POLISH_BIND`: listen address (default `127.0.0.1:8080`)
//! - `POLISH_LOG_FORMAT`: `pretty` or `json`
//! - `POLISH_MODEL`: Gemini model name
//! - `GEMINI_API_KEY` / `API_KEY`: Gemini credential
//! - `RUST_LOG`: log filter (default `info`)

use anyhow::{Context, Result};
use polish_core::LogObserver;
use polish_gemini::GeminiCorrector;
use polish_web::{routes, AppConfig, AppState, LogFormat};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(config.web.log_format);

    let corrector =
        GeminiCorrector::new(config.gemini.clone()).context("failed to build Gemini client")?;
    if config.gemini.api_key().is_none() {
        warn!("No API key configured; set GEMINI_API_KEY or API_KEY");
    }

    let state = AppState::new(Arc::new(corrector), Arc::new(LogObserver), &config);
    let (addr, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(config.web.bind, shutdown_signal())
        .with_context(|| format!("failed to bind {}", config.web.bind))?;

    info!(%addr, model = %config.gemini.model, "LinguaPolish listening");
    server.await;
    info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
