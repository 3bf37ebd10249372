//! Short link creation and resolution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::expiration_service::ExpirationManager;
use crate::domain::clock::Clock;
use crate::domain::entities::{Expiry, Record, Ttl};
use crate::domain::repositories::{InsertOutcome, MappingStore};
use crate::error::ShortenerError;
use crate::utils::code_generator::CodeGenerator;

/// Tunables of [`ShortenerService`], fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    /// Upper bound on candidates tried per `create` call.
    pub max_attempts: usize,
    /// Wall-clock bound on the candidate loop. `None` disables it.
    pub deadline: Option<Duration>,
    /// Return the existing code when the same URL is shortened twice.
    pub reverse_index: bool,
    /// TTL applied when the caller does not request one.
    pub default_ttl: Ttl,
    /// Increment the hit counter on `resolve`.
    pub count_hits: bool,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            deadline: Some(Duration::from_millis(500)),
            reverse_index: false,
            default_ttl: Ttl::Never,
            count_hits: true,
        }
    }
}

/// The public face of the engine: `create` and `resolve`.
///
/// All methods are synchronous and bounded. Call them from a blocking context
/// when the store does network I/O.
pub struct ShortenerService {
    store: Arc<dyn MappingStore>,
    generator: Arc<dyn CodeGenerator>,
    expiration: Arc<ExpirationManager>,
    clock: Arc<dyn Clock>,
    settings: ShortenerSettings,
}

impl ShortenerService {
    pub fn new(
        store: Arc<dyn MappingStore>,
        generator: Arc<dyn CodeGenerator>,
        expiration: Arc<ExpirationManager>,
        clock: Arc<dyn Clock>,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            store,
            generator,
            expiration,
            clock,
            settings,
        }
    }

    /// Maps `long_url` to a fresh short code.
    ///
    /// `ttl` of `None` applies the configured default. With the reverse index
    /// enabled, an active record for the same URL is returned instead of a new
    /// one, so the returned record may be older than this call.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::InvalidInput`] if `long_url` is blank or the TTL
    ///   cannot be represented
    /// - [`ShortenerError::ExhaustedKeyspace`] if every candidate collided
    ///   within the attempt bound, or the deadline passed
    /// - [`ShortenerError::StoreUnavailable`] if the store fails
    pub fn create(&self, long_url: &str, ttl: Option<Ttl>) -> Result<Record, ShortenerError> {
        let long_url = long_url.trim();
        if long_url.is_empty() {
            return Err(ShortenerError::invalid_input("long URL must not be empty"));
        }

        let now = self.clock.now();
        let expiry = Expiry::from_ttl(ttl.unwrap_or(self.settings.default_ttl), now)?;

        if self.settings.reverse_index
            && let Some(existing) = self.store.find_by_long_url(long_url, now)?
        {
            debug!(code = %existing.code, "Reusing active code for URL");
            metrics::counter!("linkmint_links_reused_total").increment(1);
            return Ok(existing);
        }

        let started = Instant::now();
        let mut attempts = 0;

        while attempts < self.settings.max_attempts {
            if let Some(deadline) = self.settings.deadline
                && attempts > 0
                && started.elapsed() >= deadline
            {
                warn!(attempts, "Create deadline exceeded");
                break;
            }

            attempts += 1;
            let candidate = self.generator.propose()?;
            let record = Record::new(candidate, long_url.to_string(), now, expiry);

            match self
                .store
                .try_insert(&record, self.settings.reverse_index, now)?
            {
                InsertOutcome::Inserted => {
                    debug!(code = %record.code, attempts, "Created short link");
                    metrics::counter!("linkmint_links_created_total").increment(1);
                    return Ok(record);
                }
                InsertOutcome::Existing(existing) => {
                    debug!(code = %existing.code, "URL claimed concurrently, reusing its code");
                    metrics::counter!("linkmint_links_reused_total").increment(1);
                    return Ok(existing);
                }
                InsertOutcome::Collision => {
                    debug!(code = %record.code, attempt = attempts, "Code collision");
                    metrics::counter!("linkmint_code_collisions_total").increment(1);
                }
            }
        }

        warn!(attempts, "No free short code found");
        metrics::counter!("linkmint_keyspace_exhausted_total").increment(1);
        Err(ShortenerError::ExhaustedKeyspace { attempts })
    }

    /// Returns the long URL behind `code` and counts the hit.
    ///
    /// Hit counting is best effort and never fails the resolution.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::CodeNotFound`] if the code is unknown, expired or reclaimed
    /// - [`ShortenerError::StoreUnavailable`] if the store fails
    pub fn resolve(&self, code: &str) -> Result<String, ShortenerError> {
        metrics::counter!("linkmint_resolve_total").increment(1);

        let record = self.inspect(code).inspect_err(|e| {
            if matches!(e, ShortenerError::CodeNotFound(_)) {
                metrics::counter!("linkmint_resolve_miss_total").increment(1);
            }
        })?;

        if self.settings.count_hits {
            self.store.record_hit(code);
        }

        Ok(record.long_url)
    }

    /// Returns the active record behind `code` without counting a hit.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub fn inspect(&self, code: &str) -> Result<Record, ShortenerError> {
        if code.is_empty() {
            return Err(ShortenerError::CodeNotFound(String::new()));
        }

        self.expiration
            .get(code)?
            .ok_or_else(|| ShortenerError::CodeNotFound(code.to_string()))
    }

    /// Checks that the store is reachable.
    pub fn health_check(&self) -> Result<(), ShortenerError> {
        self.store.ping()
    }

    /// Name of the store backend.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn expiration(&self) -> &Arc<ExpirationManager> {
        &self.expiration
    }
}
