//! Terminal rendering helpers shared by the quote, portfolio and symbols
//! commands.
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::{Decimal, RoundingStrategy};

const NOT_AVAILABLE: &str = "N/A";

/// How a piece of free text outside a table is emphasised.
pub enum Tone {
    Title,
    Label,
    Gain,
    Failure,
    Muted,
}

pub fn paint(text: &str, tone: Tone) -> String {
    let styled = match tone {
        Tone::Title => style(text).bold().underlined(),
        Tone::Label => style(text).bold(),
        Tone::Gain => style(text).green().bold(),
        Tone::Failure => style(text).red(),
        Tone::Muted => style(text).dim(),
    };
    styled.to_string()
}

/// Rounded-corner table with bold cyan headers.
pub fn quote_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|text| {
            Cell::new(text)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold)
        }));
    table
}

/// Placeholder for a value that could not be computed. Red when the row
/// failed, grey when the value simply does not apply.
fn missing_cell(failed: bool) -> Cell {
    let color = if failed { Color::Red } else { Color::DarkGrey };
    Cell::new(NOT_AVAILABLE)
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Right-aligned amount with two decimals and an optional suffix.
pub fn amount_cell(amount: Option<Decimal>, suffix: &str, failed: bool) -> Cell {
    match amount {
        Some(amount) => {
            Cell::new(format!("{}{suffix}", round_cents(amount))).set_alignment(CellAlignment::Right)
        }
        None => missing_cell(failed),
    }
}

/// Large amounts such as volume or market cap, abbreviated (`28.50B`).
pub fn compact_cell(amount: Option<Decimal>, failed: bool) -> Cell {
    match amount {
        Some(amount) => Cell::new(compact_amount(amount)).set_alignment(CellAlignment::Right),
        None => missing_cell(failed),
    }
}

/// 24h change, green for gains and red for losses.
pub fn change_cell(change: Option<Decimal>, failed: bool) -> Cell {
    let Some(change) = change else {
        return missing_cell(failed);
    };
    let color = if change.is_sign_negative() && !change.is_zero() {
        Color::Red
    } else {
        Color::Green
    };
    Cell::new(format!("{}%", round_cents(change)))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

fn round_cents(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

pub fn compact_amount(amount: Decimal) -> String {
    let scales = [
        (1_000_000_000_000_u64, "T"),
        (1_000_000_000, "B"),
        (1_000_000, "M"),
    ];
    for (scale, suffix) in scales {
        let scale = Decimal::from(scale);
        if amount.abs() >= scale {
            return format!("{}{suffix}", round_cents(amount / scale));
        }
    }
    round_cents(amount)
}

/// Progress bar for a batch of price lookups, one tick per distinct symbol.
pub fn fetch_progress(symbols: usize) -> ProgressBar {
    let pb = ProgressBar::new(symbols as u64);
    if let Ok(bar_style) =
        ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(bar_style.progress_chars("=> "));
    }
    pb.set_message("Fetching prices...");
    pb
}

pub fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80)
}

/// Full-width horizontal rule preceded by a blank line.
pub fn print_rule(ch: char) {
    println!("\n{}", ch.to_string().repeat(terminal_width()));
}
