//! Short code generation.
//!
//! Two strategies are available:
//!
//! - [`RandomCodeGenerator`] draws fixed-length codes from a CSPRNG. Collisions
//!   are possible and are resolved by the caller's retry loop.
//! - [`CounterCodeGenerator`] encodes values of a shared [`Sequence`]. Codes
//!   never repeat within one sequence.
//!
//! Both skip [`ReservedCodes`] before returning a candidate.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;

use crate::domain::entities::{Alphabet, ShortCode};
use crate::domain::repositories::Sequence;
use crate::error::ShortenerError;
use crate::utils::base62;

/// Codes that would shadow transport routes.
pub const DEFAULT_RESERVED_CODES: &[&str] =
    &["api", "health", "stats", "admin", "links", "dashboard"];

/// Consecutive reserved candidates tolerated before giving up.
const MAX_RESERVED_SKIPS: usize = 64;

/// Produces candidate short codes. Pure with respect to stored data.
pub trait CodeGenerator: Send + Sync {
    /// Proposes a candidate that is not a reserved word.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::ExhaustedKeyspace`] if only reserved words can
    /// be produced, or the error of the underlying [`Sequence`].
    fn propose(&self) -> Result<ShortCode, ShortenerError>;
}

/// Generation strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStrategy {
    #[default]
    Random,
    Counter,
}

impl fmt::Display for CodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeStrategy::Random => f.write_str("random"),
            CodeStrategy::Counter => f.write_str("counter"),
        }
    }
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(CodeStrategy::Random),
            "counter" => Ok(CodeStrategy::Counter),
            other => Err(format!(
                "unknown code strategy '{other}', expected 'random' or 'counter'"
            )),
        }
    }
}

/// Case-insensitive set of words that must never be issued as codes.
#[derive(Debug, Clone, Default)]
pub struct ReservedCodes {
    words: HashSet<String>,
}

impl ReservedCodes {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_ascii_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        !self.words.is_empty() && self.words.contains(&code.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Fixed-length codes drawn uniformly from an alphabet.
pub struct RandomCodeGenerator {
    alphabet: Alphabet,
    length: usize,
    reserved: ReservedCodes,
}

impl RandomCodeGenerator {
    pub fn new(alphabet: Alphabet, length: usize, reserved: ReservedCodes) -> Self {
        Self {
            alphabet,
            length,
            reserved,
        }
    }

    fn draw(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| self.alphabet.symbol(rng.random_range(0..self.alphabet.len())))
            .collect()
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn propose(&self) -> Result<ShortCode, ShortenerError> {
        for _ in 0..MAX_RESERVED_SKIPS {
            let candidate = self.draw();
            if !self.reserved.contains(&candidate) {
                return Ok(ShortCode::new_unchecked(candidate));
            }
        }

        Err(ShortenerError::ExhaustedKeyspace { attempts: 0 })
    }
}

/// Codes encoded from a monotonically increasing [`Sequence`].
pub struct CounterCodeGenerator {
    sequence: Arc<dyn Sequence>,
    alphabet: Alphabet,
    min_length: usize,
    reserved: ReservedCodes,
}

impl CounterCodeGenerator {
    pub fn new(
        sequence: Arc<dyn Sequence>,
        alphabet: Alphabet,
        min_length: usize,
        reserved: ReservedCodes,
    ) -> Self {
        Self {
            sequence,
            alphabet,
            min_length,
            reserved,
        }
    }
}

impl CodeGenerator for CounterCodeGenerator {
    fn propose(&self) -> Result<ShortCode, ShortenerError> {
        for _ in 0..MAX_RESERVED_SKIPS {
            let value = self.sequence.next()?;
            let candidate = base62::encode(value, &self.alphabet, self.min_length);
            if !self.reserved.contains(&candidate) {
                return Ok(ShortCode::new_unchecked(candidate));
            }
        }

        Err(ShortenerError::ExhaustedKeyspace { attempts: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{AtomicSequence, MockSequence};
    use std::collections::HashSet;

    fn random(length: usize) -> RandomCodeGenerator {
        RandomCodeGenerator::new(Alphabet::base62(), length, ReservedCodes::default())
    }

    #[test]
    fn test_random_code_has_configured_length() {
        let code = random(6).propose().unwrap();
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_random_code_uses_alphabet() {
        let generator = RandomCodeGenerator::new(
            Alphabet::new("ab").unwrap(),
            16,
            ReservedCodes::default(),
        );

        for _ in 0..100 {
            let code = generator.propose().unwrap();
            assert!(code.as_str().chars().all(|c| c == 'a' || c == 'b'));
        }
    }

    #[test]
    fn test_random_codes_are_mostly_unique() {
        let generator = random(8);
        let codes: HashSet<_> = (0..1_000).map(|_| generator.propose().unwrap()).collect();
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn test_random_skips_reserved_words() {
        let generator = RandomCodeGenerator::new(
            Alphabet::new("ab").unwrap(),
            1,
            ReservedCodes::new(["a"]),
        );

        for _ in 0..50 {
            assert_eq!(generator.propose().unwrap().as_str(), "b");
        }
    }

    #[test]
    fn test_random_fails_when_every_candidate_is_reserved() {
        let generator =
            RandomCodeGenerator::new(Alphabet::new("x").unwrap(), 3, ReservedCodes::new(["XXX"]));

        assert!(matches!(
            generator.propose(),
            Err(ShortenerError::ExhaustedKeyspace { .. })
        ));
    }

    #[test]
    fn test_counter_codes_follow_sequence() {
        let generator = CounterCodeGenerator::new(
            Arc::new(AtomicSequence::default()),
            Alphabet::base62(),
            6,
            ReservedCodes::default(),
        );

        assert_eq!(generator.propose().unwrap().as_str(), "000000");
        assert_eq!(generator.propose().unwrap().as_str(), "000001");
        assert_eq!(generator.propose().unwrap().as_str(), "000002");
    }

    #[test]
    fn test_counter_skips_reserved_words() {
        let api = 10 * 62 * 62 + 25 * 62 + 18;
        let generator = CounterCodeGenerator::new(
            Arc::new(AtomicSequence::starting_at(api)),
            Alphabet::base62(),
            3,
            ReservedCodes::new(DEFAULT_RESERVED_CODES),
        );

        // "API" is reserved regardless of case, so the next value is issued.
        assert_eq!(generator.propose().unwrap().as_str(), "APJ");
    }

    #[test]
    fn test_counter_propagates_sequence_errors() {
        let mut sequence = MockSequence::new();
        sequence
            .expect_next()
            .times(1)
            .returning(|| Err(ShortenerError::store_unavailable("connection reset")));

        let generator = CounterCodeGenerator::new(
            Arc::new(sequence),
            Alphabet::base62(),
            6,
            ReservedCodes::default(),
        );

        assert!(matches!(
            generator.propose(),
            Err(ShortenerError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn test_reserved_codes_are_case_insensitive() {
        let reserved = ReservedCodes::new(["Health", " api ", ""]);
        assert_eq!(reserved.len(), 2);
        assert!(reserved.contains("health"));
        assert!(reserved.contains("HEALTH"));
        assert!(reserved.contains("Api"));
        assert!(!reserved.contains("apis"));
    }

    #[test]
    fn test_code_strategy_parsing() {
        assert_eq!("random".parse::<CodeStrategy>(), Ok(CodeStrategy::Random));
        assert_eq!(" Counter ".parse::<CodeStrategy>(), Ok(CodeStrategy::Counter));
        assert!("snowflake".parse::<CodeStrategy>().is_err());
        assert_eq!(CodeStrategy::Counter.to_string(), "counter");
    }
}
