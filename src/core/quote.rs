//! Quote types and the provider abstraction

use crate::core::error::QuoteError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Crypto,
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AssetClass::Equity => "equity",
                AssetClass::Crypto => "crypto",
            }
        )
    }
}

impl FromStr for AssetClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equity" | "stock" | "stocks" => Ok(AssetClass::Equity),
            "crypto" | "cryptocurrency" => Ok(AssetClass::Crypto),
            _ => Err(anyhow::anyhow!("Invalid asset class: {}", s)),
        }
    }
}

/// A point-in-time price observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub current_price: Decimal,
    pub change_24h_percent: Decimal,
    pub volume_24h: Decimal,
    pub market_cap: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
}

/// Percentage change from `previous_close` to `current`.
///
/// A zero or missing previous close yields `0` instead of a division error,
/// as does a result outside the `Decimal` range.
pub fn percent_change(current: Decimal, previous_close: Option<Decimal>) -> Decimal {
    match previous_close {
        Some(previous) if !previous.is_zero() => current
            .checked_sub(previous)
            .and_then(|delta| delta.checked_div(previous))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError>;
}
