pub mod adapters;
pub mod app;
mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod ports;
pub mod seed;
pub mod state;
pub mod store;
mod templates;
pub mod types;

pub use app::app;

use adapters::TokioTimeProvider;
use seed::SeedError;
use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn serve(addr: SocketAddr, config: config::AppConfig) -> Result<(), ServeError> {
    let lifecycle_interval = config.lifecycle_interval;
    let public_url = config.public_url().to_string();
    let state = AppState::new(config, TokioTimeProvider)?;
    tracing::info!(
        users = state.store.users.len(),
        notifications = state.store.notifications.len(),
        "stores ready"
    );
    let _sweeper = lifecycle::maybe_start_sweeper(
        lifecycle_interval,
        state.time,
        Arc::clone(&state.store),
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    tracing::info!(%addr, %public_url, "listening");
    axum::serve(listener, app::router(state)).await?;
    Ok(())
}
