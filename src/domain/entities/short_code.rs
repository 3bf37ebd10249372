//! Short code value type and the alphabet codes are drawn from.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::error::ShortenerError;

/// The default base62 alphabet, in digit-value order.
pub const BASE62_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// An ordered set of unique, URL-safe symbols.
///
/// The position of a symbol is its digit value when encoding counters, so the
/// first symbol acts as the zero digit used for padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Builds an alphabet from a string of ASCII alphanumeric characters.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::InvalidInput`] if the string is empty, contains
    /// a non-alphanumeric character, or repeats a symbol.
    pub fn new(symbols: &str) -> Result<Self, ShortenerError> {
        if symbols.is_empty() {
            return Err(ShortenerError::invalid_input("alphabet must not be empty"));
        }

        let mut seen = [false; 128];
        for c in symbols.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(ShortenerError::invalid_input(format!(
                    "alphabet symbol {c:?} is not an ASCII letter or digit"
                )));
            }
            let slot = &mut seen[c as usize];
            if *slot {
                return Err(ShortenerError::invalid_input(format!(
                    "alphabet symbol {c:?} appears more than once"
                )));
            }
            *slot = true;
        }

        Ok(Self {
            symbols: symbols.as_bytes().to_vec(),
        })
    }

    /// The standard `[0-9A-Za-z]` alphabet.
    pub fn base62() -> Self {
        Self {
            symbols: BASE62_ALPHABET.as_bytes().to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the symbol with digit value `index`.
    ///
    /// `index` must be below [`Self::len`].
    pub fn symbol(&self, index: usize) -> char {
        self.symbols[index] as char
    }

    pub fn as_str(&self) -> &str {
        // Constructors only admit ASCII.
        std::str::from_utf8(&self.symbols).unwrap_or_default()
    }

    /// Number of distinct codes of exactly `length` symbols, saturating at `u128::MAX`.
    pub fn keyspace(&self, length: usize) -> u128 {
        let radix = self.symbols.len() as u128;
        (0..length).fold(1u128, |acc, _| acc.saturating_mul(radix))
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::base62()
    }
}

/// A short code identifying one mapping.
///
/// Codes are unique among active records only; a reclaimed code may be issued
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Wraps a string without checking it against any alphabet.
    ///
    /// Generators produce valid codes by construction; stores hand back codes
    /// they previously accepted.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ShortCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}
