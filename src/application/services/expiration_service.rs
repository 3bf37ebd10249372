//! Lazy and proactive expiration of short-link records.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{Liveness, Record};
use crate::domain::repositories::MappingStore;
use crate::error::ShortenerError;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Codes popped from the expiry index.
    pub examined: usize,
    /// Records transitioned from active to expired by this pass.
    pub expired: usize,
    /// Records permanently removed; their codes are free again.
    pub reclaimed: usize,
}

/// Enforces record lifetimes.
///
/// [`ExpirationManager::get`] applies expiry at read time; [`ExpirationManager::sweep`]
/// reclaims storage in the background. Both rely on [`crate::domain::entities::Expiry::is_due`].
pub struct ExpirationManager {
    store: Arc<dyn MappingStore>,
    clock: Arc<dyn Clock>,
    grace: TimeDelta,
    batch_size: usize,
}

impl ExpirationManager {
    /// Creates a manager.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::InvalidInput`] if `grace` does not fit a
    /// timestamp delta or `batch_size` is zero.
    pub fn new(
        store: Arc<dyn MappingStore>,
        clock: Arc<dyn Clock>,
        grace: Duration,
        batch_size: usize,
    ) -> Result<Self, ShortenerError> {
        let grace = TimeDelta::from_std(grace)
            .map_err(|_| ShortenerError::invalid_input("expired grace period is too large"))?;

        if batch_size == 0 {
            return Err(ShortenerError::invalid_input(
                "sweep batch size must be at least 1",
            ));
        }

        Ok(Self {
            store,
            clock,
            grace,
            batch_size,
        })
    }

    /// Returns the record for `code` if it is active.
    ///
    /// A record whose TTL has elapsed is marked expired before `None` is
    /// returned, whether or not a sweep has reached it yet.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::StoreUnavailable`] if the store fails. A store
    /// outage is never reported as a missing record.
    pub fn get(&self, code: &str) -> Result<Option<Record>, ShortenerError> {
        let Some(record) = self.store.fetch(code)? else {
            return Ok(None);
        };

        let now = self.clock.now();
        match record.liveness(now) {
            Liveness::Active => Ok(Some(record)),
            Liveness::Expired => Ok(None),
            Liveness::Due => {
                if self.store.mark_expired(code, now)? {
                    debug!(code = %code, "Lazily expired record");
                }
                Ok(None)
            }
        }
    }

    /// Runs one incremental reclamation pass.
    ///
    /// Codes due at `now - grace` are popped in batches; each record is marked
    /// expired, then deleted, one store call at a time. No lock is held across
    /// records.
    ///
    /// # Errors
    ///
    /// Stops at the first store failure and returns it. Records already
    /// reclaimed by the pass stay reclaimed.
    pub fn sweep(&self) -> Result<SweepReport, ShortenerError> {
        let now = self.clock.now();
        let cutoff = now.checked_sub_signed(self.grace).unwrap_or(now);
        let mut report = SweepReport::default();

        loop {
            let batch = self.store.next_due(cutoff, self.batch_size)?;
            let batch_len = batch.len();

            for code in batch {
                report.examined += 1;

                if self.store.mark_expired(code.as_str(), cutoff)? {
                    report.expired += 1;
                }
                if self.store.delete_expired(code.as_str(), cutoff)? {
                    report.reclaimed += 1;
                }
            }

            if batch_len < self.batch_size {
                break;
            }
        }

        metrics::counter!("linkmint_sweep_reclaimed_total").increment(report.reclaimed as u64);

        if report.reclaimed > 0 {
            info!(
                examined = report.examined,
                expired = report.expired,
                reclaimed = report.reclaimed,
                "Sweep reclaimed expired records"
            );
        } else {
            debug!(examined = report.examined, "Sweep found nothing to reclaim");
        }

        Ok(report)
    }

    /// Starts the periodic sweep on the tokio runtime.
    ///
    /// Each pass runs on the blocking pool. Ticks missed while a pass is still
    /// running are skipped. Abort the returned handle to stop sweeping.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // The first tick completes immediately.
            ticker.tick().await;

            info!("Expiration sweeper started (every {:?})", period);

            loop {
                ticker.tick().await;

                let manager = Arc::clone(&self);
                match tokio::task::spawn_blocking(move || manager.sweep()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!("Expiration sweep failed: {}", e),
                    Err(e) => warn!("Expiration sweep task panicked: {}", e),
                }
            }
        })
    }
}
