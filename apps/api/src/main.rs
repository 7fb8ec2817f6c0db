mod config;
mod document;
mod errors;
mod export;
mod extract;
mod history;
mod ingest;
mod render;
mod routes;
mod sections;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::export::{ConversionBackend, ExportBridge, HttpConversionBackend};
use crate::routes::build_router;
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CVGenius API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the conversion backend for pdf/docx, if one is configured
    let backend: Option<Arc<dyn ConversionBackend>> = match &config.export_service_url {
        Some(url) => {
            let client: Arc<dyn ConversionBackend> = Arc::new(
                HttpConversionBackend::new(url.clone(), config.export_timeout)
                    .context("Failed to build conversion service HTTP client")?,
            );
            info!("Conversion service: {url} ({})", client.name());
            Some(client)
        }
        None => {
            warn!("EXPORT_SERVICE_URL not set; pdf and docx exports are unavailable");
            None
        }
    };
    let bridge = ExportBridge::new(backend, config.export_max_bytes, config.date_locale);

    info!(
        "Defaults: template={} locale={:?} history_limit={}",
        config.default_template, config.date_locale, config.history_limit
    );
    info!(
        "Retention: session_ttl={}s export_retention={}s import_max_bytes={}",
        config.session_ttl.as_secs(),
        config.export_retention.as_secs(),
        config.import_max_bytes
    );

    // Build app state
    let state = AppState::new(config.clone(), bridge);

    // Spawn the expiry sweeper for idle sessions and old export artifacts
    let sweeper = {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await; // Skip the first immediate tick
            loop {
                interval.tick().await;
                state.sweep_expired(chrono::Utc::now()).await;
            }
        })
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let result = axum::serve(listener, app).await;

    sweeper.abort();
    let _ = sweeper.await;

    result?;
    Ok(())
}
