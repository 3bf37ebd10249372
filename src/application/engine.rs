//! Wiring of the generator, store and expiration manager into one engine.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{ExpirationManager, ShortenerService, ShortenerSettings};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{Alphabet, BASE62_ALPHABET, Ttl};
use crate::domain::repositories::{AtomicSequence, MappingStore, Sequence};
use crate::error::ShortenerError;
use crate::infrastructure::persistence::MemoryStore;
use crate::utils::code_generator::{
    CodeGenerator, CodeStrategy, CounterCodeGenerator, DEFAULT_RESERVED_CODES, RandomCodeGenerator,
    ReservedCodes,
};

/// Longest code length accepted by [`EngineConfig`].
pub const MAX_CODE_LENGTH: usize = 32;

/// Engine settings, immutable once the engine is built.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub strategy: CodeStrategy,
    /// Fixed length for random codes, minimum length for counter codes.
    pub code_length: usize,
    pub alphabet: String,
    pub reserved_codes: Vec<String>,
    pub default_ttl: Ttl,
    pub max_attempts: usize,
    pub create_deadline: Option<Duration>,
    pub sweep_interval: Duration,
    pub sweep_batch_size: usize,
    pub expired_grace: Duration,
    pub reverse_index: bool,
    pub count_hits: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: CodeStrategy::Random,
            code_length: 6,
            alphabet: BASE62_ALPHABET.to_string(),
            reserved_codes: DEFAULT_RESERVED_CODES
                .iter()
                .map(|w| w.to_string())
                .collect(),
            default_ttl: Ttl::Never,
            max_attempts: 10,
            create_deadline: Some(Duration::from_millis(500)),
            sweep_interval: Duration::from_secs(60),
            sweep_batch_size: 256,
            expired_grace: Duration::ZERO,
            reverse_index: false,
            count_hits: true,
        }
    }
}

impl EngineConfig {
    /// Checks the settings that the engine cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::InvalidInput`] describing the first bad setting.
    pub fn validate(&self) -> Result<Alphabet, ShortenerError> {
        let alphabet = Alphabet::new(&self.alphabet)?;

        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(ShortenerError::invalid_input(format!(
                "code length must be between 1 and {MAX_CODE_LENGTH}, got {}",
                self.code_length
            )));
        }

        if self.strategy == CodeStrategy::Counter && alphabet.len() < 2 {
            return Err(ShortenerError::invalid_input(
                "counter strategy needs an alphabet of at least 2 symbols",
            ));
        }

        if self.max_attempts == 0 {
            return Err(ShortenerError::invalid_input(
                "max create attempts must be at least 1",
            ));
        }

        if self.sweep_batch_size == 0 {
            return Err(ShortenerError::invalid_input(
                "sweep batch size must be at least 1",
            ));
        }

        Ok(alphabet)
    }

    fn settings(&self) -> ShortenerSettings {
        ShortenerSettings {
            max_attempts: self.max_attempts,
            deadline: self.create_deadline,
            reverse_index: self.reverse_index,
            default_ttl: self.default_ttl,
            count_hits: self.count_hits,
        }
    }
}

/// A ready-to-use engine: the resolution service and its expiration manager.
#[derive(Clone)]
pub struct Engine {
    pub shortener: Arc<ShortenerService>,
    pub expiration: Arc<ExpirationManager>,
}

impl Engine {
    /// Builds an engine over `store`.
    ///
    /// `sequence` backs counter generation and is unused by the random strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenerError::InvalidInput`] if `config` is invalid.
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn MappingStore>,
        sequence: Arc<dyn Sequence>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ShortenerError> {
        let alphabet = config.validate()?;
        let reserved = ReservedCodes::new(&config.reserved_codes);

        let generator: Arc<dyn CodeGenerator> = match config.strategy {
            CodeStrategy::Random => Arc::new(RandomCodeGenerator::new(
                alphabet,
                config.code_length,
                reserved,
            )),
            CodeStrategy::Counter => Arc::new(CounterCodeGenerator::new(
                sequence,
                alphabet,
                config.code_length,
                reserved,
            )),
        };

        let expiration = Arc::new(ExpirationManager::new(
            store.clone(),
            clock.clone(),
            config.expired_grace,
            config.sweep_batch_size,
        )?);

        let shortener = Arc::new(ShortenerService::new(
            store,
            generator,
            expiration.clone(),
            clock,
            config.settings(),
        ));

        Ok(Self {
            shortener,
            expiration,
        })
    }

    /// Builds an engine on a fresh [`MemoryStore`] with an in-process counter.
    pub fn in_memory(config: &EngineConfig) -> Result<Self, ShortenerError> {
        Self::in_memory_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`Self::in_memory`], with an explicit clock.
    pub fn in_memory_with_clock(
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ShortenerError> {
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(AtomicSequence::default()),
            clock,
        )
    }
}
