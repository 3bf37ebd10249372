//! Utility functions for code generation and URL processing.
//!
//! - [`base62`] - Positional encoding of counter values
//! - [`code_generator`] - Random and counter-based code generators
//! - [`url_normalizer`] - URL normalization for the HTTP layer

pub mod base62;
pub mod code_generator;
pub mod url_normalizer;
