use super::util::{Attempt, with_retry};
use crate::core::clock::Clock;
use crate::core::config::{CoinGeckoProviderConfig, RetryConfig};
use crate::core::error::{QuoteError, UpstreamError};
use crate::core::quote::{Quote, QuoteProvider};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "coingecko";

/// Ticker symbols the platform supports, with their CoinGecko coin ids.
const COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("USDT", "tether"),
    ("BNB", "binancecoin"),
    ("SOL", "solana"),
    ("XRP", "ripple"),
    ("USDC", "usd-coin"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("MATIC", "matic-network"),
    ("LTC", "litecoin"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
];

pub fn coin_id(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.trim();
    COIN_IDS
        .iter()
        .find(|(ticker, _)| ticker.eq_ignore_ascii_case(symbol))
        .map(|(_, id)| *id)
}

pub fn supported_symbols() -> &'static [(&'static str, &'static str)] {
    COIN_IDS
}

/// Per-coin object in the `/simple/price` response
#[derive(Deserialize, Debug)]
struct CoinGeckoPrice {
    usd: Option<Decimal>,
    usd_24h_change: Option<Decimal>,
    usd_24h_vol: Option<Decimal>,
    usd_market_cap: Option<Decimal>,
}

/// Crypto quotes from CoinGecko's simple price endpoint.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    clock: Arc<dyn Clock>,
    attempts: u32,
    rate_limit_delay: Duration,
    retry_delay: Duration,
}

impl CoinGeckoProvider {
    pub fn new(
        config: &CoinGeckoProviderConfig,
        retry: &RetryConfig,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(CoinGeckoProvider {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            clock,
            attempts: retry.attempts,
            rate_limit_delay: Duration::from_millis(retry.crypto_rate_limit_delay_ms),
            retry_delay: Duration::from_millis(retry.crypto_retry_delay_ms),
        })
    }

    async fn attempt(&self, coin_id: &str) -> Attempt<Quote> {
        match self.request(coin_id).await {
            Ok(quote) => Attempt::Ready(quote),
            Err(cause @ UpstreamError::RateLimitExceeded { .. }) => Attempt::Retry {
                cause,
                delay: self.rate_limit_delay,
            },
            Err(cause) => Attempt::Retry {
                cause,
                delay: self.retry_delay,
            },
        }
    }

    async fn request(&self, coin_id: &str) -> Result<Quote, UpstreamError> {
        let url = Url::parse_with_params(
            &format!("{}/simple/price", self.base_url),
            &[
                ("ids", coin_id),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
                ("include_24hr_vol", "true"),
                ("include_market_cap", "true"),
            ],
        )
        .map_err(|e| UpstreamError::transient(PROVIDER, format!("Invalid URL: {e}")))?;
        debug!("Requesting crypto price from {}", url);

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request
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

        let mut data = response
            .json::<HashMap<String, CoinGeckoPrice>>()
            .await
            .map_err(|e| {
                UpstreamError::transient(PROVIDER, format!("Failed to parse JSON response: {e}"))
            })?;

        let price = data.remove(coin_id).ok_or_else(|| {
            UpstreamError::transient(PROVIDER, format!("No price entry for {coin_id}"))
        })?;

        // Missing numeric fields read as zero
        Ok(Quote {
            current_price: price.usd.unwrap_or(Decimal::ZERO),
            change_24h_percent: price.usd_24h_change.unwrap_or(Decimal::ZERO),
            volume_24h: price.usd_24h_vol.unwrap_or(Decimal::ZERO),
            market_cap: Some(price.usd_market_cap.unwrap_or(Decimal::ZERO)),
            observed_at: self.clock.now(),
        })
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    #[instrument(name = "CoinGeckoPriceFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let coin_id =
            coin_id(symbol).ok_or_else(|| QuoteError::UnsupportedSymbol(symbol.to_string()))?;

        let this = self;
        with_retry(self.clock.as_ref(), self.attempts, move |_| {
            this.attempt(coin_id)
        })
        .await
        .map_err(|source| QuoteError::Fetch {
            symbol: symbol.to_string(),
            attempts: self.attempts.max(1),
            source,
        })
    }
}
