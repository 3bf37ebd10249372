//! Storage contract for code-to-record mappings.

use chrono::{DateTime, Utc};

use crate::domain::entities::{Record, ShortCode};
use crate::error::ShortenerError;

/// Result of an atomic insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record now owns its code.
    Inserted,
    /// The code belongs to another active record; nothing was written.
    Collision,
    /// The reverse index already maps the long URL to this active record;
    /// nothing was written.
    Existing(Record),
}

/// Concurrent key-value storage for short-link records.
///
/// Every method is atomic with respect to every other method on the same code.
/// Implementations never partially apply a write.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryStore`] - sharded in-memory maps
/// - [`crate::infrastructure::persistence::RedisStore`] - durable, shared across processes
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
pub trait MappingStore: Send + Sync {
    /// Claims `record.code` for `record`.
    ///
    /// The claim fails with [`InsertOutcome::Collision`] only if the current
    /// occupant is active at `now`. An occupant that is due or expired is
    /// displaced, and its reverse-index entry dropped.
    ///
    /// With `index_long_url` set, the reverse-index check and both index writes
    /// form a single atomic unit: if another active record already holds
    /// `record.long_url`, that record is returned as [`InsertOutcome::Existing`].
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::StoreUnavailable`] if the backend fails. No
    /// write is visible in that case.
    fn try_insert(
        &self,
        record: &Record,
        index_long_url: bool,
        now: DateTime<Utc>,
    ) -> Result<InsertOutcome, ShortenerError>;

    /// Reads a record as stored, whatever its lifecycle state.
    ///
    /// Visibility rules are applied by
    /// [`crate::application::services::ExpirationManager::get`].
    fn fetch(&self, code: &str) -> Result<Option<Record>, ShortenerError>;

    /// Looks up the active record currently indexed for `long_url`.
    ///
    /// Returns `None` if the indexed record is gone, no longer active at `now`,
    /// or now maps a different URL.
    fn find_by_long_url(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Record>, ShortenerError>;

    /// Tags a record as expired if it is active and its expiry is due at `now`.
    ///
    /// Returns whether a transition happened. Repeated calls return `false`.
    fn mark_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, ShortenerError>;

    /// Permanently removes a record whose expiry is due at `cutoff`.
    ///
    /// Records created after the sweep picked the code are left alone. Returns
    /// whether a record was removed; its code is free for reuse afterwards.
    fn delete_expired(&self, code: &str, cutoff: DateTime<Utc>) -> Result<bool, ShortenerError>;

    /// Removes and returns up to `limit` codes from the expiry index whose
    /// expiry is at or before `cutoff`, earliest first.
    fn next_due(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ShortCode>, ShortenerError>;

    /// Increments the hit counter of `code`.
    ///
    /// Best effort: the increment may be dropped under contention or on backend
    /// errors, and it never blocks the caller.
    fn record_hit(&self, code: &str);

    /// Verifies that the backend is reachable.
    fn ping(&self) -> Result<(), ShortenerError>;

    /// Short backend name for health reports and logs.
    fn backend(&self) -> &'static str;
}
