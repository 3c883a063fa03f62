mod api;
mod auth;
mod config;
mod engine;
mod error;
mod feed;
mod models;
mod observability;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::auth::GoogleIdentityProvider;
use crate::feed::memory::MemoryStore;
use crate::feed::FeedHandles;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let store = Arc::new(MemoryStore::new(config.event_buffer_size));
    for email in &config.operator_emails {
        store.register_operator(email);
    }

    let http = reqwest::Client::new();
    let identity = Arc::new(GoogleIdentityProvider::new(
        http.clone(),
        config.oauth_audience.clone(),
    ));

    let shared_state = Arc::new(state::AppState::new(
        &config,
        store.clone(),
        identity,
        http,
    ));

    let feeds = FeedHandles::subscribe(&store);
    tokio::spawn(engine::sync::run_sync_engine(shared_state.clone(), feeds));

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
