//! Handler for link inspection endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns details of an active short link without counting a hit.
///
/// # Endpoint
///
/// `GET /api/v1/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, expired or reclaimed.
pub async fn link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let record = state
        .engine(move |shortener| shortener.inspect(&code))
        .await?;

    let short_url = state.short_url(record.code.as_str());

    Ok(Json(LinkResponse::new(record, short_url)))
}
