//! # linkmint
//!
//! A concurrent short-code generation and resolution engine for URL shortening,
//! with a thin Axum front end.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Records, codes, the clock, and storage traits
//! - **Application Layer** ([`application`]) - The engine: `create`, `resolve`, expiration
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory and Redis stores
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Counter-based or random base62 codes with a reserved-word filter
//! - Atomic claims: exactly one creator wins any given code
//! - Bounded collision retry with a wall-clock deadline
//! - Lazy expiry on read plus an incremental background sweep
//! - Optional reverse index for idempotent re-shortening
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379"  # Optional, in-memory otherwise
//! cargo run
//! ```
//!
//! ## Embedding the engine
//!
//! ```rust,ignore
//! use linkmint::application::{Engine, EngineConfig};
//!
//! let engine = Engine::in_memory(&EngineConfig::default())?;
//! let record = engine.shortener.create("https://example.com/a", None)?;
//! assert_eq!(engine.shortener.resolve(record.code.as_str())?, "https://example.com/a");
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{AppError, ShortenerError};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        ExpirationManager, ShortenerService, ShortenerSettings, SweepReport,
    };
    pub use crate::application::{Engine, EngineConfig};
    pub use crate::domain::clock::{Clock, ManualClock, SystemClock};
    pub use crate::domain::entities::{Expiry, Record, RecordStatus, ShortCode, Ttl};
    pub use crate::domain::repositories::{InsertOutcome, MappingStore, Sequence};
    pub use crate::error::{AppError, ShortenerError};
    pub use crate::infrastructure::persistence::{MemoryStore, RedisStore};
    pub use crate::state::AppState;
    pub use crate::utils::code_generator::CodeStrategy;
}
