//! Infrastructure layer for external integrations.
//!
//! This layer implements the storage contracts defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory and Redis mapping stores

pub mod persistence;
