//! Canonical form for long URLs submitted over HTTP.
//!
//! The engine itself only rejects blank input. Syntax checks live here, at the
//! transport edge, so that equivalent spellings of a URL share one reverse-index
//! entry.

use url::Url;

/// Longest URL accepted for shortening, in bytes after normalization.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL is longer than {MAX_URL_LENGTH} bytes")]
    TooLong,
}

/// Normalizes a long URL.
///
/// - Surrounding whitespace is trimmed
/// - Only `http` and `https` with a host are accepted
/// - The host is lowercased, the default port and the fragment are dropped
/// - Path and query are preserved as-is
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     normalize_url("  HTTPS://Example.COM:443/a?b=1#top ").unwrap(),
///     "https://example.com/a?b=1"
/// );
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url = Url::parse(input.trim())
        .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    // The url crate already lowercases domain hosts for special schemes.
    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    url.set_fragment(None);

    // Url::port() is None when the port equals the scheme default.
    let normalized = String::from(url);
    if normalized.len() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    Ok(normalized)
}
