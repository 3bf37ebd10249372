//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, engine wiring, the expiration sweeper and the
//! Axum server lifecycle.

use crate::application::Engine;
use crate::config::Config;
use crate::domain::clock::SystemClock;
use crate::domain::repositories::{AtomicSequence, MappingStore, Sequence};
use crate::infrastructure::persistence::{MemoryStore, RedisStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Opens the configured store and the sequence that goes with it.
///
/// Redis provides both, shared across processes. Without Redis, records live
/// in memory and the counter is process-local.
///
/// # Errors
///
/// Returns an error if Redis is configured but unreachable.
pub fn open_store(config: &Config) -> Result<(Arc<dyn MappingStore>, Arc<dyn Sequence>)> {
    match &config.redis_url {
        Some(redis_url) => {
            let store = Arc::new(
                RedisStore::connect(
                    redis_url,
                    config.redis_key_prefix.clone(),
                    config.engine.expired_grace,
                )
                .context("Failed to open Redis store")?,
            );
            tracing::info!("Store: Redis");
            Ok((store.clone(), store))
        }
        None => {
            tracing::info!("Store: in-memory (records are lost on restart)");
            Ok((
                Arc::new(MemoryStore::new()),
                Arc::new(AtomicSequence::default()),
            ))
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Mapping store (Redis or in-memory)
/// - Short-code engine
/// - Background expiration sweeper
/// - Axum HTTP server, until Ctrl-C
///
/// # Errors
///
/// Returns an error if:
/// - The store cannot be opened
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (store, sequence) = tokio::task::spawn_blocking({
        let config = config.clone();
        move || open_store(&config)
    })
    .await
    .context("Store initialization task failed")??;

    let engine = Engine::new(&config.engine, store, sequence, Arc::new(SystemClock))
        .context("Failed to build engine")?;

    let sweeper = engine
        .expiration
        .clone()
        .spawn_sweeper(config.engine.sweep_interval);

    let state = AppState::new(engine.shortener.clone(), config.base_url.clone());
    let app = app_router(state, config.rate_limit);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
