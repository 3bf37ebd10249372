//! Storage trait definitions for the domain layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Contracts
//!
//! - [`MappingStore`] - Atomic code claims, lookups, expiry transitions and reclamation
//! - [`Sequence`] - Shared counter for counter-based code generation

pub mod mapping_store;
pub mod sequence;

pub use mapping_store::{InsertOutcome, MappingStore};
pub use sequence::{AtomicSequence, Sequence};

#[cfg(test)]
pub use mapping_store::MockMappingStore;
#[cfg(test)]
pub use sequence::MockSequence;
