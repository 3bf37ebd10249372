//! Engine services for the application layer.

pub mod expiration_service;
pub mod shortener_service;

pub use expiration_service::{ExpirationManager, SweepReport};
pub use shortener_service::{ShortenerService, ShortenerSettings};
