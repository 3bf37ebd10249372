//! Shared state injected into every handler.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::ShortenerService;
use crate::error::{AppError, ShortenerError};

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService>,
    pub base_url: String,
}

impl AppState {
    pub fn new(shortener: Arc<ShortenerService>, base_url: impl Into<String>) -> Self {
        Self {
            shortener,
            base_url: base_url.into(),
        }
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Runs an engine call on the blocking pool.
    ///
    /// The engine is synchronous and may wait on the store, so it never runs on
    /// an async worker thread.
    pub async fn engine<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&ShortenerService) -> Result<T, ShortenerError> + Send + 'static,
        T: Send + 'static,
    {
        let shortener = Arc::clone(&self.shortener);

        tokio::task::spawn_blocking(move || f(&shortener))
            .await
            .map_err(|e| {
                tracing::error!("Engine task failed: {}", e);
                AppError::internal("Engine task failed", json!({}))
            })?
            .map_err(AppError::from)
    }
}
