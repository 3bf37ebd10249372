//! Application layer: the short-code engine.
//!
//! Services consume the domain storage traits and expose the engine's two
//! public operations to the transport layer.
//!
//! # Components
//!
//! - [`services::ShortenerService`] - `create` and `resolve`, with the bounded collision loop
//! - [`services::ExpirationManager`] - lazy expiry on read and the incremental sweep
//! - [`engine::Engine`] - builds both from an [`engine::EngineConfig`]

pub mod engine;
pub mod services;

pub use engine::{Engine, EngineConfig};
