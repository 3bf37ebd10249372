//! API route configuration.

use crate::api::handlers::{link_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Versioned API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /v1/shorten`       - Create a short link
/// - `GET  /v1/links/{code}`  - Inspect an active short link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/shorten", post(shorten_handler))
        .route("/v1/links/{code}", get(link_handler))
}
