use super::ui;
use crate::providers::coingecko::supported_symbols;
use comfy_table::Cell;

pub fn render_table() -> String {
    let mut table = ui::quote_table(&["Symbol", "CoinGecko id"]);
    for (symbol, id) in supported_symbols() {
        table.add_row(vec![Cell::new(symbol), Cell::new(id)]);
    }
    table.to_string()
}

pub fn run() {
    println!(
        "{}\n\n{}",
        ui::paint("Supported crypto symbols", ui::Tone::Title),
        render_table()
    );
}
