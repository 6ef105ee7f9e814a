use pricefeed::core::config::AppConfig;
use pricefeed::core::{AssetClass, Clock, ManualClock, QuoteError};
use pricefeed::resolver::QuoteResolver;
use rust_decimal_macros::dec;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_finnhub_mock_server(symbol: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quote"))
            .and(query_param("symbol", symbol))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_coingecko_mock_server(coin_id: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", coin_id))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap().len()
    }
}

const AAPL_RESPONSE: &str = r#"{"c": 190.0, "pc": 200.0, "v": 1000}"#;
const BTC_RESPONSE: &str = r#"{
    "bitcoin": {
        "usd": 60000,
        "usd_24h_change": 2.5,
        "usd_24h_vol": 30000000000,
        "usd_market_cap": 1200000000000
    }
}"#;

fn write_config(
    file: &tempfile::NamedTempFile,
    finnhub_uri: &str,
    coingecko_uri: &str,
    portfolios: &str,
) {
    let config_content = format!(
        r#"
portfolios:
{portfolios}
providers:
  finnhub:
    base_url: {finnhub_uri}
    api_key: "test-key"
  coingecko:
    base_url: {coingecko_uri}
retry:
  attempts: 3
  equity_delay_ms: 1
  crypto_rate_limit_delay_ms: 1
  crypto_retry_delay_ms: 1
"#
    );
    fs::write(file.path(), config_content).expect("Failed to write config file");
}

#[test_log::test(tokio::test)]
async fn test_full_portfolio_flow_with_mock() {
    let finnhub = test_utils::create_finnhub_mock_server("AAPL", AAPL_RESPONSE).await;
    let coingecko = test_utils::create_coingecko_mock_server("bitcoin", BTC_RESPONSE).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(
        &config_file,
        &finnhub.uri(),
        &coingecko.uri(),
        r#"  - name: "Mixed"
    holdings:
      - symbol: "AAPL"
        asset_class: equity
        units: 10
      - symbol: "btc"
        asset_class: crypto
        units: 0.1
      - symbol: "AAPL"
        asset_class: equity
        units: 2"#,
    );

    let result = pricefeed::run_command(
        pricefeed::AppCommand::Portfolio,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Portfolio command failed with: {:?}",
        result.err()
    );

    // Repeated holdings resolve once
    assert_eq!(test_utils::request_count(&finnhub).await, 1);
    assert_eq!(test_utils::request_count(&coingecko).await, 1);
}

#[test_log::test(tokio::test)]
async fn test_quote_command_reports_failures_without_erroring() {
    let finnhub = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::path("/quote"))
        .respond_with(wiremock::ResponseTemplate::new(429))
        .mount(&finnhub)
        .await;
    let coingecko = wiremock::MockServer::start().await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write_config(&config_file, &finnhub.uri(), &coingecko.uri(), "  []");

    let result = pricefeed::run_command(
        pricefeed::AppCommand::Quote {
            symbols: vec!["AAPL".to_string()],
            asset_class: AssetClass::Equity,
            json: true,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(test_utils::request_count(&finnhub).await, 3);
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let result = pricefeed::run_command(
        pricefeed::AppCommand::Portfolio,
        Some("/nonexistent/pricefeed/config.yaml"),
    )
    .await;

    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_resolver_caches_until_ttl_with_real_providers() {
    let finnhub = test_utils::create_finnhub_mock_server("AAPL", AAPL_RESPONSE).await;
    let coingecko = test_utils::create_coingecko_mock_server("bitcoin", BTC_RESPONSE).await;

    let mut config = AppConfig::default();
    config.providers.finnhub.base_url = finnhub.uri();
    config.providers.coingecko.base_url = coingecko.uri();
    let clock = Arc::new(ManualClock::default());
    let resolver = QuoteResolver::from_config_with_clock(&config, clock.clone()).unwrap();

    let quote = resolver.get_price("AAPL", AssetClass::Equity).await.unwrap();
    info!(?quote, "Resolved AAPL");
    assert_eq!(quote.current_price, dec!(190));
    assert_eq!(quote.change_24h_percent, dec!(-5));
    assert_eq!(quote.observed_at, clock.now());

    clock.advance(Duration::from_secs(30 * 60));
    let cached = resolver.get_price("AAPL", AssetClass::Equity).await.unwrap();
    assert_eq!(cached, quote);
    assert_eq!(test_utils::request_count(&finnhub).await, 1);

    clock.advance(Duration::from_secs(30 * 60));
    resolver.get_price("AAPL", AssetClass::Equity).await.unwrap();
    assert_eq!(test_utils::request_count(&finnhub).await, 2);

    let btc = resolver.get_price("BTC", AssetClass::Crypto).await.unwrap();
    assert_eq!(btc.market_cap, Some(dec!(1200000000000)));
    assert_eq!(test_utils::request_count(&coingecko).await, 1);
}

#[test_log::test(tokio::test)]
async fn test_unsupported_crypto_symbol_never_reaches_network() {
    let finnhub = wiremock::MockServer::start().await;
    let coingecko = wiremock::MockServer::start().await;

    let mut config = AppConfig::default();
    config.providers.finnhub.base_url = finnhub.uri();
    config.providers.coingecko.base_url = coingecko.uri();
    let clock = Arc::new(ManualClock::default());
    let resolver = QuoteResolver::from_config_with_clock(&config, clock.clone()).unwrap();

    let result = resolver.get_price("NOTACOIN", AssetClass::Crypto).await;

    assert_eq!(
        result,
        Err(QuoteError::UnsupportedSymbol("NOTACOIN".to_string()))
    );
    assert_eq!(test_utils::request_count(&coingecko).await, 0);
    assert!(clock.sleeps().is_empty());
    assert!(resolver.cache().is_empty().await);
}
