//! Core domain entities of the short-code engine.
//!
//! # Entity Types
//!
//! - [`ShortCode`] / [`Alphabet`] - Identifiers and the symbols they are drawn from
//! - [`Record`] - A code-to-URL mapping with its expiry and lifecycle tag
//! - [`Expiry`] / [`Ttl`] - Lifetime of a record, with `Never` as a distinct variant

pub mod record;
pub mod short_code;

pub use record::{Expiry, Liveness, Record, RecordStatus, Ttl};
pub use short_code::{Alphabet, BASE62_ALPHABET, ShortCode};
