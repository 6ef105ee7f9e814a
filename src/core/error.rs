//! Market data error types

use thiserror::Error;

/// Why a single upstream attempt failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    /// The provider answered with HTTP 429
    #[error("Rate limit exceeded by {provider}")]
    RateLimitExceeded { provider: &'static str },

    /// Non-429 error status, transport failure or unusable payload
    #[error("Upstream failure from {provider}: {reason}")]
    TransientUpstreamFailure {
        provider: &'static str,
        reason: String,
    },
}

/// Terminal outcome of a quote resolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// No provider-side identifier is known for this symbol
    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// The retry budget was exhausted; carries the last cause
    #[error("Unable to fetch market data for {symbol} after {attempts} attempts: {source}")]
    Fetch {
        symbol: String,
        attempts: u32,
        #[source]
        source: UpstreamError,
    },
}

impl UpstreamError {
    pub(crate) fn transient(provider: &'static str, reason: impl Into<String>) -> Self {
        UpstreamError::TransientUpstreamFailure {
            provider,
            reason: reason.into(),
        }
    }
}
