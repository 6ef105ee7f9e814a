use super::ui;
use crate::core::cache::CacheKey;
use crate::core::config::Portfolio;
use crate::core::portfolio::{PortfolioValue, value_portfolio};
use crate::resolver::{QuoteResolver, distinct_keys};
use anyhow::Result;
use comfy_table::Cell;
use rust_decimal::Decimal;
use std::collections::HashMap;

impl PortfolioValue {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::quote_table(&[
            "Holding",
            "Class",
            "Units",
            "Price (USD)",
            "Value (USD)",
            "24h Change",
            "Weight",
        ]);

        for holding in &self.holdings {
            let failed = holding.error.is_some();
            table.add_row(vec![
                Cell::new(&holding.symbol),
                Cell::new(holding.asset_class.to_string()),
                Cell::new(holding.units.normalize().to_string()),
                ui::amount_cell(holding.price, "", failed),
                ui::amount_cell(holding.value, "", failed),
                ui::change_cell(holding.change_24h_percent, failed),
                ui::amount_cell(holding.weight, "%", false),
            ]);
        }

        let total_value = match self.total_value {
            Some(v) => ui::paint(&format!("{v:.2}"), ui::Tone::Gain),
            None => ui::paint("N/A", ui::Tone::Failure),
        };

        let mut output = format!("Portfolio: {}\n\n", ui::paint(&self.name, ui::Tone::Title));
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nTotal Value ({}): {}",
            ui::paint("USD", ui::Tone::Label),
            total_value
        ));
        if let Some(change) = self.change_24h_percent {
            output.push_str(&format!(
                "\n24h Change: {}",
                ui::paint(&format!("{change:.2}%"), ui::Tone::Muted)
            ));
        }

        for holding in &self.holdings {
            if let Some(error) = &holding.error {
                let message = format!("{}: {}", holding.symbol, error);
                output.push_str(&format!("\n{}", ui::paint(&message, ui::Tone::Failure)));
            }
        }

        output
    }
}

pub async fn run(resolver: &QuoteResolver, portfolios: &[Portfolio]) -> Result<()> {
    if portfolios.is_empty() {
        println!("No portfolios configured.");
        return Ok(());
    }

    let keys = distinct_keys(
        portfolios
            .iter()
            .flat_map(|p| &p.holdings)
            .map(|h| CacheKey::new(h.asset_class, &h.symbol)),
    );

    let pb = ui::fetch_progress(keys.len());
    let quotes: HashMap<_, _> = resolver
        .get_prices(keys, &|_| pb.inc(1))
        .await
        .into_iter()
        .collect();
    pb.finish_and_clear();

    let summaries: Vec<PortfolioValue> = portfolios
        .iter()
        .map(|portfolio| value_portfolio(portfolio, &quotes))
        .collect();

    // Only shown when every portfolio has a total
    let grand_total = summaries
        .iter()
        .try_fold(Decimal::ZERO, |acc, summary| {
            acc.checked_add(summary.total_value?)
        });

    let num_summaries = summaries.len();
    for (i, summary) in summaries.iter().enumerate() {
        println!("{}", summary.display_as_table());
        if i < num_summaries - 1 {
            ui::print_rule('─');
        }
    }

    if let (Some(grand_total), true) = (grand_total, num_summaries > 1) {
        let term_width = ui::terminal_width();
        ui::print_rule('=');
        // Pad before styling; escape codes would skew the width
        let total_str = format!("{:>term_width$}", format!("Grand Total (USD): {grand_total:.2}"));
        println!("{}", ui::paint(&total_str, ui::Tone::Gain));
    }

    Ok(())
}
