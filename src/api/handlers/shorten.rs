//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_normalizer::normalize_url;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/v1/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/a",
///   "ttl_seconds": 3600
/// }
/// ```
///
/// `ttl_seconds` may be omitted (server default) or `null` (never expires).
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "code": "b7K9pL",
///   "short_url": "http://localhost:8080/b7K9pL",
///   "long_url": "https://example.com/a",
///   "created_at": "2024-01-01T00:00:00Z",
///   "expires_at": "2024-01-01T01:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the URL is invalid
/// - 503 Service Unavailable if no free code was found or the store is down
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let long_url = normalize_url(&payload.url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;
    let ttl = payload.ttl();

    let record = state
        .engine(move |shortener| shortener.create(&long_url, ttl))
        .await?;

    let short_url = state.short_url(record.code.as_str());

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::new(record, short_url)),
    ))
}
