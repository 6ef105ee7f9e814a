pub mod cli;
pub mod core;
pub mod providers;
pub mod resolver;

use crate::core::config::AppConfig;
use crate::core::quote::AssetClass;
use crate::resolver::QuoteResolver;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Quote {
        symbols: Vec<String>,
        asset_class: AssetClass,
        json: bool,
    },
    Portfolio,
    Symbols,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        portfolios = config.portfolios.len(),
        cache_ttl_secs = config.cache.ttl_secs,
        "Loaded config"
    );
    Ok(config)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("pricefeed starting...");

    match command {
        AppCommand::Quote {
            symbols,
            asset_class,
            json,
        } => {
            let config = load_config(config_path)?;
            let resolver = QuoteResolver::from_config(&config)?;
            cli::quote::run(&resolver, &symbols, asset_class, json).await
        }
        AppCommand::Portfolio => {
            let config = load_config(config_path)?;
            let resolver = QuoteResolver::from_config(&config)?;
            cli::portfolio::run(&resolver, &config.portfolios).await
        }
        AppCommand::Symbols => {
            cli::symbols::run();
            Ok(())
        }
    }
}
