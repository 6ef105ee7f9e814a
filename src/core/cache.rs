use crate::core::quote::{AssetClass, Quote};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache key combining asset class and symbol, so the same ticker in two
/// asset classes maps to two entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub asset_class: AssetClass,
    pub symbol: String,
}

impl CacheKey {
    pub fn new(asset_class: AssetClass, symbol: &str) -> Self {
        Self {
            asset_class,
            symbol: symbol.trim().to_uppercase(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.asset_class, self.symbol)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    quote: Quote,
    stored_at: DateTime<Utc>,
}

/// In-memory quote cache with a fixed time-to-live.
///
/// Entries are superseded on every put and never removed; staleness is
/// decided on read.
pub struct QuoteCache {
    inner: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: chrono::Duration,
}

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    pub async fn get_fresh(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Quote> {
        let cache = self.inner.read().await;
        match cache.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => {
                debug!("Cache HIT for key: {}", key);
                Some(entry.quote.clone())
            }
            Some(_) => {
                debug!("Cache entry stale for key: {}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: CacheKey, quote: Quote, now: DateTime<Utc>) {
        let mut cache = self.inner.write().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(
            key,
            CacheEntry {
                quote,
                stored_at: now,
            },
        );
    }

    /// Number of entries held, fresh or stale.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
