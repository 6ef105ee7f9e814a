pub mod coingecko;
pub mod finnhub;
pub mod util;

pub(crate) const USER_AGENT: &str = concat!("pricefeed/", env!("CARGO_PKG_VERSION"));
