use super::util::{Attempt, with_retry};
use crate::core::clock::Clock;
use crate::core::config::{FinnhubProviderConfig, RetryConfig};
use crate::core::error::{QuoteError, UpstreamError};
use crate::core::quote::{Quote, QuoteProvider, percent_change};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "finnhub";

/// Response from the `/quote` endpoint
#[derive(Deserialize, Debug)]
struct FinnhubQuote {
    /// Current price
    #[serde(rename = "c")]
    current: Option<Decimal>,
    /// Previous close
    #[serde(rename = "pc")]
    previous_close: Option<Decimal>,
    #[serde(rename = "v")]
    volume: Option<Decimal>,
}

/// Equity quotes from Finnhub.
///
/// Every failure (rate limit, error status, bad payload) is retried with a
/// linear backoff of `equity_delay_ms * attempt_number`.
pub struct FinnhubProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    clock: Arc<dyn Clock>,
    attempts: u32,
    retry_delay: Duration,
}

impl FinnhubProvider {
    pub fn new(
        config: &FinnhubProviderConfig,
        retry: &RetryConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(FinnhubProvider {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            clock,
            attempts: retry.attempts,
            retry_delay: Duration::from_millis(retry.equity_delay_ms),
        })
    }

    async fn attempt(&self, symbol: &str, attempt: u32) -> Attempt<Quote> {
        match self.request(symbol).await {
            Ok(quote) => Attempt::Ready(quote),
            Err(cause) => Attempt::Retry {
                cause,
                delay: self.retry_delay * (attempt + 1),
            },
        }
    }

    async fn request(&self, symbol: &str) -> Result<Quote, UpstreamError> {
        let url = Url::parse_with_params(
            &format!("{}/quote", self.base_url),
            &[("symbol", symbol)],
        )
        .map_err(|e| UpstreamError::transient(PROVIDER, format!("Invalid URL: {e}")))?;
        debug!("Requesting equity quote for {}", symbol);

        let response = self
            .client
            .get(url)
            .header("X-Finnhub-Token", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                UpstreamError::transient(PROVIDER, format!("Request error: {}", e.without_url()))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimitExceeded { provider: PROVIDER });
        }
        if !status.is_success() {
            return Err(UpstreamError::transient(
                PROVIDER,
                format!("HTTP error: {status}"),
            ));
        }

        let data = response.json::<FinnhubQuote>().await.map_err(|e| {
            UpstreamError::transient(PROVIDER, format!("Failed to parse JSON response: {e}"))
        })?;
        debug!(response = ?data, "Received Finnhub response");

        let current = data.current.ok_or_else(|| {
            UpstreamError::transient(PROVIDER, format!("Missing current price for {symbol}"))
        })?;

        Ok(Quote {
            current_price: current,
            change_24h_percent: percent_change(current, data.previous_close),
            volume_24h: data.volume.unwrap_or(Decimal::ZERO),
            market_cap: None,
            observed_at: self.clock.now(),
        })
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    #[instrument(name = "FinnhubQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let this = self;
        with_retry(self.clock.as_ref(), self.attempts, move |attempt| {
            this.attempt(symbol, attempt)
        })
        .await
        .map_err(|source| QuoteError::Fetch {
            symbol: symbol.to_string(),
            attempts: self.attempts.max(1),
            source,
        })
    }
}
