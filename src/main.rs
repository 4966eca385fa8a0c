mod app_state;
mod config;
mod error;
mod gigachat;
mod routes;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app_state::AppState;
use config::Config;
use gigachat::GigaChatClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignored silently if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gigachat_relay=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    // The Sber hosts present certificates from the Russian Trusted Root CA,
    // which is absent from standard trust stores. Add it on top of the
    // defaults so public-CA endpoints still validate.
    let ca_pem = std::fs::read(&config.ca_cert_path).with_context(|| {
        format!("Failed to read CA bundle {}", config.ca_cert_path.display())
    })?;
    let ca_cert = reqwest::Certificate::from_pem(&ca_pem)
        .context("Invalid CA certificate")?;

    let http_client = reqwest::Client::builder()
        .add_root_certificate(ca_cert)
        .build()
        .context("Failed to build HTTP client")?;

    let gigachat = GigaChatClient::new(
        http_client,
        gigachat::AUTH_URL,
        &config.chat_api_url,
        &config.client_id,
        &config.client_secret,
    );

    let addr: SocketAddr = config.addr().parse().context("Invalid bind address")?;
    let state = Arc::new(AppState { gigachat });

    let app = app(state);

    tracing::info!("gigachat-relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::handler))
        .route("/chat",   post(routes::chat::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received — stopping");
}
