use crate::core::quote::AssetClass;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const FINNHUB_API_KEY_ENV: &str = "FINNHUB_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Holding {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub units: Decimal,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Portfolio {
    pub name: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FinnhubProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for FinnhubProviderConfig {
    fn default() -> Self {
        FinnhubProviderConfig {
            base_url: "https://finnhub.io/api/v1".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for CoinGeckoProviderConfig {
    fn default() -> Self {
        CoinGeckoProviderConfig {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub finnhub: FinnhubProviderConfig,
    #[serde(default)]
    pub coingecko: CoinGeckoProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { ttl_secs: 60 * 60 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    /// Base of the linear equity backoff
    pub equity_delay_ms: u64,
    pub crypto_rate_limit_delay_ms: u64,
    pub crypto_retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            attempts: 3,
            equity_delay_ms: 1000,
            crypto_rate_limit_delay_ms: 30_000,
            crypto_retry_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub portfolios: Vec<Portfolio>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "pricefeed", "pricefeed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Applies overrides from the environment; `lookup` resolves a variable name.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(FINNHUB_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("Using Finnhub API key from {}", FINNHUB_API_KEY_ENV);
            self.providers.finnhub.api_key = key;
        }
    }
}
