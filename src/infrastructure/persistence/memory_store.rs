//! In-memory implementation of the mapping store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::try_result::TryResult;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::entities::{Expiry, Record, RecordStatus, ShortCode};
use crate::domain::repositories::{InsertOutcome, MappingStore};
use crate::error::ShortenerError;

/// Sharded in-memory store.
///
/// - `records` maps code to record
/// - `by_url` is the reverse index, long URL to code
/// - `expiry_index` orders expiring codes by expiry time for the sweep
///
/// When both maps are locked at once, `by_url` is always locked first.
/// Entries in `expiry_index` may be stale (the code was re-issued); the
/// conditional [`MappingStore::delete_expired`] makes them harmless.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Record>,
    by_url: DashMap<String, String>,
    expiry_index: Mutex<BTreeSet<(DateTime<Utc>, ShortCode)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            by_url: DashMap::with_capacity(capacity),
            expiry_index: Mutex::new(BTreeSet::new()),
        }
    }

    /// Number of records physically held, expired ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of reverse-index entries.
    pub fn indexed_urls(&self) -> usize {
        self.by_url.len()
    }

    /// Returns the record behind `code` if it is active and still maps `long_url`.
    fn active_for_url(&self, code: &str, long_url: &str, now: DateTime<Utc>) -> Option<Record> {
        self.records
            .get(code)
            .filter(|r| r.long_url == long_url && r.is_active_at(now))
            .map(|r| r.value().clone())
    }

    /// Drops the reverse entry of `long_url` if it still points at `code`.
    fn unlink_url(&self, long_url: &str, code: &str) {
        self.by_url.remove_if(long_url, |_, indexed| indexed == code);
    }
}

impl MappingStore for MemoryStore {
    fn try_insert(
        &self,
        record: &Record,
        index_long_url: bool,
        now: DateTime<Utc>,
    ) -> Result<InsertOutcome, ShortenerError> {
        // Holding the reverse slot serializes creators of the same URL.
        let url_slot = index_long_url.then(|| self.by_url.entry(record.long_url.clone()));

        if let Some(Entry::Occupied(slot)) = &url_slot
            && let Some(existing) = self.active_for_url(slot.get(), &record.long_url, now)
        {
            return Ok(InsertOutcome::Existing(existing));
        }

        let displaced = match self.records.entry(record.code.as_str().to_owned()) {
            Entry::Occupied(mut occupant) => {
                if occupant.get().is_active_at(now) {
                    return Ok(InsertOutcome::Collision);
                }
                Some(occupant.insert(record.clone()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record.clone());
                None
            }
        };

        if let Some(slot) = url_slot {
            slot.insert(record.code.as_str().to_owned());
        }

        if let Expiry::At(expires_at) = record.expiry {
            self.expiry_index
                .lock()
                .insert((expires_at, record.code.clone()));
        }

        if let Some(old) = displaced {
            debug!(code = %record.code, "Reused code of an expired record");
            if old.long_url != record.long_url {
                self.unlink_url(&old.long_url, record.code.as_str());
            }
        }

        Ok(InsertOutcome::Inserted)
    }

    fn fetch(&self, code: &str) -> Result<Option<Record>, ShortenerError> {
        Ok(self.records.get(code).map(|r| r.value().clone()))
    }

    fn find_by_long_url(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Record>, ShortenerError> {
        let Some(code) = self.by_url.get(long_url).map(|c| c.value().clone()) else {
            return Ok(None);
        };

        Ok(self.active_for_url(&code, long_url, now))
    }

    fn mark_expired(&self, code: &str, now: DateTime<Utc>) -> Result<bool, ShortenerError> {
        let Some(mut record) = self.records.get_mut(code) else {
            return Ok(false);
        };

        if record.status == RecordStatus::Active && record.expiry.is_due(now) {
            record.status = RecordStatus::Expired;
            return Ok(true);
        }

        Ok(false)
    }

    fn delete_expired(&self, code: &str, cutoff: DateTime<Utc>) -> Result<bool, ShortenerError> {
        let Some((_, removed)) = self
            .records
            .remove_if(code, |_, record| record.expiry.is_due(cutoff))
        else {
            return Ok(false);
        };

        self.unlink_url(&removed.long_url, code);
        Ok(true)
    }

    fn next_due(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ShortCode>, ShortenerError> {
        let mut due = Vec::new();

        // Lock per pop so inserts interleave with a long sweep.
        while due.len() < limit {
            let mut index = self.expiry_index.lock();
            match index.first() {
                Some((expires_at, _)) if *expires_at <= cutoff => {
                    if let Some((_, code)) = index.pop_first() {
                        due.push(code);
                    }
                }
                _ => break,
            }
        }

        Ok(due)
    }

    fn record_hit(&self, code: &str) {
        // A contended shard costs a hit, never a wait.
        if let TryResult::Present(mut record) = self.records.try_get_mut(code) {
            record.hits = record.hits.saturating_add(1);
        }
    }

    fn ping(&self) -> Result<(), ShortenerError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
