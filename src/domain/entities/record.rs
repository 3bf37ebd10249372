//! Record entity: one code-to-URL mapping and its lifecycle state.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

use super::short_code::ShortCode;
use crate::error::ShortenerError;

/// Requested lifetime of a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Never,
    After(Duration),
}

impl Ttl {
    /// Interprets a seconds value where `0` means "never expires".
    pub fn from_secs(seconds: u64) -> Self {
        if seconds == 0 {
            Ttl::Never
        } else {
            Ttl::After(Duration::from_secs(seconds))
        }
    }
}

/// When a record stops being active.
///
/// `Never` is its own variant so that permanent records are never compared
/// against a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    /// Computes the expiry of a record created at `now` with the given TTL.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::InvalidInput`] if `now + ttl` is not a
    /// representable timestamp.
    pub fn from_ttl(ttl: Ttl, now: DateTime<Utc>) -> Result<Self, ShortenerError> {
        match ttl {
            Ttl::Never => Ok(Expiry::Never),
            Ttl::After(duration) => TimeDelta::from_std(duration)
                .ok()
                .and_then(|delta| now.checked_add_signed(delta))
                .map(Expiry::At)
                .ok_or_else(|| {
                    ShortenerError::invalid_input(format!(
                        "TTL of {}s is too large; use no expiry instead",
                        duration.as_secs()
                    ))
                }),
        }
    }

    /// Returns true once `at` has reached the expiry instant.
    ///
    /// This is the single expiry predicate shared by lookups, stores and the sweep.
    pub fn is_due(&self, at: DateTime<Utc>) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(expires_at) => at >= *expires_at,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiry::Never => None,
            Expiry::At(expires_at) => Some(*expires_at),
        }
    }
}

/// Stored lifecycle tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Active,
    Expired,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Expired => "expired",
        }
    }
}

/// Observed state of a record at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Visible to `resolve`.
    Active,
    /// Still tagged active, but its TTL has elapsed; must be marked expired.
    Due,
    /// Tagged expired, waiting for reclamation.
    Expired,
}

/// A stored mapping between a short code and a long URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub code: ShortCode,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expiry: Expiry,
    pub status: RecordStatus,
    pub hits: u64,
}

impl Record {
    /// Creates a fresh, active record with no hits.
    pub fn new(
        code: ShortCode,
        long_url: String,
        created_at: DateTime<Utc>,
        expiry: Expiry,
    ) -> Self {
        Self {
            code,
            long_url,
            created_at,
            expiry,
            status: RecordStatus::Active,
            hits: 0,
        }
    }

    pub fn liveness(&self, now: DateTime<Utc>) -> Liveness {
        match self.status {
            RecordStatus::Expired => Liveness::Expired,
            RecordStatus::Active if self.expiry.is_due(now) => Liveness::Due,
            RecordStatus::Active => Liveness::Active,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.liveness(now) == Liveness::Active
    }
}
