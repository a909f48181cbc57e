mod config;
mod errors;
mod mail;
mod models;
mod relay;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, TransportConfig};
use crate::mail::build_dispatcher_or_unconfigured;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Malformed values fail here; missing mail credentials only fail requests.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting relay API v{}", env!("CARGO_PKG_VERSION"));

    match &config.mail.transport {
        TransportConfig::Smtp(smtp) => info!(
            "Mail transport: SMTP {}:{} ({:?})",
            smtp.host,
            smtp.port,
            smtp.encryption()
        ),
        TransportConfig::HostedApi(api) => info!("Mail transport: hosted API {}", api.base_url),
    }
    info!("Relaying submissions to {}", config.mail.to_email);

    let dispatcher = build_dispatcher_or_unconfigured(&config.mail);
    let port = config.port;
    let cors = cors_layer(config.cors_allow_origin.as_deref())?;
    let state = AppState::new(config, dispatcher);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive unless a single website origin is configured.
fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ALLOW_ORIGIN '{origin}' is not a valid header value"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST]))
}
