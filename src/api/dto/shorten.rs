//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Record, Ttl};

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,

    /// Lifetime in seconds.
    ///
    /// - absent: the server default
    /// - `null` or `0`: never expires
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub ttl_seconds: Option<Option<u64>>,
}

impl ShortenRequest {
    /// TTL to pass to the engine; `None` selects the configured default.
    pub fn ttl(&self) -> Option<Ttl> {
        self.ttl_seconds
            .map(|secs| secs.map_or(Ttl::Never, Ttl::from_secs))
    }
}

/// A created (or reused) short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    /// `null` when the link never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponse {
    pub fn new(record: Record, short_url: String) -> Self {
        Self {
            short_url,
            expires_at: record.expiry.timestamp(),
            created_at: record.created_at,
            long_url: record.long_url,
            code: record.code.into_inner(),
        }
    }
}
