//! Values configured portfolios from resolved quotes.
use crate::core::cache::CacheKey;
use crate::core::config::Portfolio;
use crate::core::error::QuoteError;
use crate::core::quote::{AssetClass, Quote};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// Market value and weight of a single holding.
#[derive(Debug, Clone)]
pub struct HoldingValue {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub units: Decimal,
    pub price: Option<Decimal>,
    pub value: Option<Decimal>,
    pub change_24h_percent: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub error: Option<String>,
}

/// Summary of a portfolio's holdings, priced in USD.
#[derive(Debug)]
pub struct PortfolioValue {
    pub name: String,
    pub holdings: Vec<HoldingValue>,
    pub total_value: Option<Decimal>,
    pub change_24h_percent: Option<Decimal>,
}

/// Calculates the market value and weight of each holding in a portfolio.
///
/// Totals and weights are only reported when every holding was priced; a
/// single failed quote leaves them as `None` while the other rows still
/// carry their values.
pub fn value_portfolio(
    portfolio: &Portfolio,
    quotes: &HashMap<CacheKey, Result<Quote, QuoteError>>,
) -> PortfolioValue {
    let mut holdings = Vec::with_capacity(portfolio.holdings.len());
    let mut total = Decimal::ZERO;
    // `None` once the weighted sum leaves the `Decimal` range
    let mut weighted_change = Some(Decimal::ZERO);
    let mut all_valid = true;

    for holding in &portfolio.holdings {
        let key = CacheKey::new(holding.asset_class, &holding.symbol);
        let mut row = HoldingValue {
            symbol: key.symbol.clone(),
            asset_class: holding.asset_class,
            units: holding.units,
            price: None,
            value: None,
            change_24h_percent: None,
            weight: None,
            error: None,
        };

        match quotes.get(&key) {
            Some(Ok(quote)) => {
                row.price = Some(quote.current_price);
                row.change_24h_percent = Some(quote.change_24h_percent);
                let valued = holding
                    .units
                    .checked_mul(quote.current_price)
                    .and_then(|value| Some((value, total.checked_add(value)?)));
                match valued {
                    Some((value, new_total)) => {
                        total = new_total;
                        weighted_change = weighted_change.and_then(|sum| {
                            sum.checked_add(value.checked_mul(quote.change_24h_percent)?)
                        });
                        row.value = Some(value);
                    }
                    None => {
                        all_valid = false;
                        debug!("Value of {} is out of range", key);
                        row.error = Some(format!("Value out of range for {}", key.symbol));
                    }
                }
            }
            Some(Err(e)) => {
                all_valid = false;
                debug!("Quote error for {}: {}", key, e);
                row.error = Some(e.to_string());
            }
            None => {
                all_valid = false;
                debug!("Quote for {} not found in resolved results", key);
                row.error = Some(format!("Price data not available for {}", key.symbol));
            }
        }
        holdings.push(row);
    }

    let mut summary = PortfolioValue {
        name: portfolio.name.clone(),
        holdings,
        total_value: None,
        change_24h_percent: None,
    };

    if all_valid {
        summary.total_value = Some(total);
        if total > Decimal::ZERO {
            summary.change_24h_percent = weighted_change.and_then(|sum| sum.checked_div(total));
            for holding in &mut summary.holdings {
                holding.weight = holding.value.and_then(|value| {
                    value.checked_div(total)?.checked_mul(Decimal::ONE_HUNDRED)
                });
            }
        }
    }

    summary
}
