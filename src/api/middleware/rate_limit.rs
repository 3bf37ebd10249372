//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::PeerIpKeyExtractor,
};

/// Creates a per-IP rate limiter for API endpoints.
///
/// # Limits
///
/// - **Rate**: `per_second` tokens replenished per second (`RATE_LIMIT_PER_SECOND`)
/// - **Burst**: `burst` requests (`RATE_LIMIT_BURST`)
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Zero values
/// fall back to the governor defaults.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address extracted from the
/// socket peer address, so the router must be served with connect info.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/v1/shorten", post(shorten_handler))
///     .layer(rate_limit::layer(2, 100));
/// ```
pub fn layer(
    per_second: u64,
    burst: u32,
) -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf: GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>> =
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid rate limit ({}/s, burst {}), using defaults",
                    per_second,
                    burst
                );
                GovernorConfig::default()
            });

    GovernorLayer::new(Arc::new(governor_conf))
}
