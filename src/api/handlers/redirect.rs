//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look the code up, expiring it on the spot if its TTL has elapsed
/// 2. Count the hit (best effort)
/// 3. Return 307 Temporary Redirect
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, expired or reclaimed.
/// Returns 503 Service Unavailable if the store is unreachable.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state
        .engine(move |shortener| shortener.resolve(&code))
        .await?;

    Ok(Redirect::temporary(&long_url))
}
