use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pricefeed::core::log::init_logging;
use pricefeed::core::quote::AssetClass;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show current quotes for one or more symbols
    Quote {
        /// Ticker symbols, e.g. AAPL or BTC
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Asset class of the symbols: equity or crypto
        #[arg(short, long, default_value = "equity")]
        asset_class: AssetClass,

        /// Print quotes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Value the configured portfolios
    Portfolio,
    /// List supported crypto symbols
    Symbols,
}

impl From<Commands> for pricefeed::AppCommand {
    fn from(cmd: Commands) -> pricefeed::AppCommand {
        match cmd {
            Commands::Quote {
                symbols,
                asset_class,
                json,
            } => pricefeed::AppCommand::Quote {
                symbols,
                asset_class,
                json,
            },
            Commands::Portfolio => pricefeed::AppCommand::Portfolio,
            Commands::Symbols => pricefeed::AppCommand::Symbols,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => pricefeed::cli::setup::setup(),
        Some(cmd) => pricefeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
