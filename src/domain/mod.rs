//! Domain layer: entities, time, and storage contracts.
//!
//! This layer has no dependency on infrastructure or transport code.
//!
//! # Architecture
//!
//! - [`entities`] - Short codes, records and their lifecycle
//! - [`repositories`] - The [`repositories::MappingStore`] and
//!   [`repositories::Sequence`] contracts implemented in
//!   [`crate::infrastructure::persistence`]
//! - [`clock`] - Time source, swappable in tests
//!
//! # Record Lifecycle
//!
//! 1. Born `active` in [`repositories::MappingStore::try_insert`]
//! 2. Marked `expired` once its TTL elapsed, lazily on lookup or by the sweep
//! 3. Deleted by the sweep, after which its code can be issued again

pub mod clock;
pub mod entities;
pub mod repositories;
