//! DTOs for link inspection endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Record;

/// JSON representation of an active short link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub short_url: String,
    pub long_url: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Approximate; increments may be dropped under contention.
    pub hits: u64,
}

impl LinkResponse {
    pub fn new(record: Record, short_url: String) -> Self {
        Self {
            short_url,
            status: record.status.as_str(),
            expires_at: record.expiry.timestamp(),
            created_at: record.created_at,
            hits: record.hits,
            long_url: record.long_url,
            code: record.code.into_inner(),
        }
    }
}
