//! Mapping store implementations.
//!
//! Concrete implementations of the domain storage traits.
//!
//! # Stores
//!
//! - [`MemoryStore`] - Sharded in-memory maps for a single process
//! - [`RedisStore`] - Durable store shared across processes; also a [`crate::domain::repositories::Sequence`]

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
