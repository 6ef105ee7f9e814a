//! Resolves `(asset class, symbol)` pairs to quotes, cache first.
use crate::core::cache::{CacheKey, QuoteCache};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::error::QuoteError;
use crate::core::quote::{AssetClass, Quote, QuoteProvider};
use crate::providers::{coingecko::CoinGeckoProvider, finnhub::FinnhubProvider};
use anyhow::Result;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Cache-fronted quote lookup with one upstream provider per asset class.
///
/// Build one per process and share it behind an `Arc`.
pub struct QuoteResolver {
    cache: QuoteCache,
    equity: Box<dyn QuoteProvider>,
    crypto: Box<dyn QuoteProvider>,
    clock: Arc<dyn Clock>,
}

impl QuoteResolver {
    pub fn new(
        cache: QuoteCache,
        equity: Box<dyn QuoteProvider>,
        crypto: Box<dyn QuoteProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            equity,
            crypto,
            clock,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let equity = FinnhubProvider::new(
            &config.providers.finnhub,
            &config.retry,
            Arc::clone(&clock),
        )?;
        let crypto = CoinGeckoProvider::new(
            &config.providers.coingecko,
            &config.retry,
            Arc::clone(&clock),
        )?;

        Ok(Self::new(
            QuoteCache::new(config.cache.ttl()),
            Box::new(equity),
            Box::new(crypto),
            clock,
        ))
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// Returns the cached quote while fresh, otherwise fetches and caches a
    /// new one. A failed fetch leaves any existing entry untouched.
    #[instrument(skip(self))]
    pub async fn get_price(&self, symbol: &str, asset_class: AssetClass) -> Result<Quote, QuoteError> {
        let key = CacheKey::new(asset_class, symbol);
        self.resolve(&key).await
    }

    /// Resolves every distinct key concurrently; `on_resolved` fires as each
    /// one completes. Results keep the order in which keys first appear.
    pub async fn get_prices(
        &self,
        keys: impl IntoIterator<Item = CacheKey>,
        on_resolved: &dyn Fn(&CacheKey),
    ) -> Vec<(CacheKey, Result<Quote, QuoteError>)> {
        let distinct = distinct_keys(keys);
        let futures = distinct.into_iter().map(|key| async move {
            let result = self.resolve(&key).await;
            on_resolved(&key);
            (key, result)
        });
        join_all(futures).await
    }

    async fn resolve(&self, key: &CacheKey) -> Result<Quote, QuoteError> {
        if let Some(quote) = self.cache.get_fresh(key, self.clock.now()).await {
            return Ok(quote);
        }

        let provider = match key.asset_class {
            AssetClass::Equity => &self.equity,
            AssetClass::Crypto => &self.crypto,
        };
        let quote = provider.fetch_quote(&key.symbol).await?;

        debug!("Resolved {} at {}", key, quote.current_price);
        self.cache
            .put(key.clone(), quote.clone(), self.clock.now())
            .await;
        Ok(quote)
    }
}

/// Drops repeated keys, keeping first-seen order.
pub fn distinct_keys(keys: impl IntoIterator<Item = CacheKey>) -> Vec<CacheKey> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}
