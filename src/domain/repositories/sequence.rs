//! Monotonic counter backing counter-based code generation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ShortenerError;

/// A shared, atomically incremented counter.
///
/// Every call returns a value no other call has returned. Cross-process
/// uniqueness requires an implementation backed by shared storage.
#[cfg_attr(test, mockall::automock)]
pub trait Sequence: Send + Sync {
    /// Returns the next value.
    ///
    /// # Errors
    ///
    /// - [`ShortenerError::ExhaustedKeyspace`] once the counter cannot advance
    /// - [`ShortenerError::StoreUnavailable`] if a shared backend fails
    fn next(&self) -> Result<u64, ShortenerError>;
}

/// Process-local sequence over an [`AtomicU64`].
#[derive(Debug, Default)]
pub struct AtomicSequence {
    next: AtomicU64,
}

impl AtomicSequence {
    /// Creates a sequence whose first value is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Sequence for AtomicSequence {
    fn next(&self) -> Result<u64, ShortenerError> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map_err(|_| ShortenerError::ExhaustedKeyspace { attempts: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sequence_starts_at_zero() {
        let seq = AtomicSequence::default();
        assert_eq!(seq.next().unwrap(), 0);
        assert_eq!(seq.next().unwrap(), 1);
    }

    #[test]
    fn test_sequence_refuses_to_wrap() {
        let seq = AtomicSequence::starting_at(u64::MAX - 1);
        assert_eq!(seq.next().unwrap(), u64::MAX - 1);
        assert!(matches!(
            seq.next(),
            Err(ShortenerError::ExhaustedKeyspace { .. })
        ));
    }

    #[test]
    fn test_sequence_is_unique_across_threads() {
        let seq = Arc::new(AtomicSequence::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = Arc::clone(&seq);
                thread::spawn(move || (0..1_000).map(|_| seq.next().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value), "value {value} issued twice");
            }
        }
        assert_eq!(seen.len(), 8_000);
    }
}
