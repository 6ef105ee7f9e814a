use super::ui;
use crate::core::cache::CacheKey;
use crate::core::error::QuoteError;
use crate::core::quote::{AssetClass, Quote};
use crate::resolver::QuoteResolver;
use anyhow::{Context, Result};
use comfy_table::{Cell, Color};
use serde::Serialize;
use tracing::warn;

const FETCH_FAILED: &str = "Unable to fetch market data";

#[derive(Debug, Serialize)]
struct QuoteOutput<'a> {
    symbol: &'a str,
    asset_class: AssetClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    quote: Option<&'a Quote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn failure_message(error: &QuoteError) -> String {
    match error {
        QuoteError::UnsupportedSymbol(symbol) => format!("Unsupported symbol: {symbol}"),
        QuoteError::Fetch { .. } => FETCH_FAILED.to_string(),
    }
}

pub fn render_table(results: &[(CacheKey, Result<Quote, QuoteError>)]) -> String {
    let mut table = ui::quote_table(&[
        "Symbol",
        "Class",
        "Price (USD)",
        "24h Change",
        "24h Volume",
        "Market Cap",
    ]);

    for (key, result) in results {
        let mut row = vec![
            Cell::new(&key.symbol),
            Cell::new(key.asset_class.to_string()),
        ];
        match result {
            Ok(quote) => row.extend([
                ui::amount_cell(Some(quote.current_price), "", false),
                ui::change_cell(Some(quote.change_24h_percent), false),
                ui::compact_cell(Some(quote.volume_24h), false),
                ui::compact_cell(quote.market_cap, false),
            ]),
            Err(e) => {
                row.push(Cell::new(failure_message(e)).fg(Color::Red));
                row.extend((0..3).map(|_| ui::change_cell(None, true)));
            }
        }
        table.add_row(row);
    }

    table.to_string()
}

pub fn render_json(results: &[(CacheKey, Result<Quote, QuoteError>)]) -> Result<String> {
    let output: Vec<QuoteOutput> = results
        .iter()
        .map(|(key, result)| QuoteOutput {
            symbol: &key.symbol,
            asset_class: key.asset_class,
            quote: result.as_ref().ok(),
            error: result.as_ref().err().map(failure_message),
        })
        .collect();
    serde_json::to_string_pretty(&output).context("Failed to serialize quotes")
}

pub async fn run(
    resolver: &QuoteResolver,
    symbols: &[String],
    asset_class: AssetClass,
    json: bool,
) -> Result<()> {
    let keys = symbols.iter().map(|s| CacheKey::new(asset_class, s));
    let results = resolver.get_prices(keys, &|_| ()).await;

    for (key, result) in &results {
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Quote resolution failed");
        }
    }

    if json {
        println!("{}", render_json(&results)?);
    } else {
        println!("{}", render_table(&results));
    }
    Ok(())
}
