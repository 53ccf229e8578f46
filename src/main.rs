use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxrate::core::log::init_logging;

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
    /// List supported currencies, optionally filtered by code or name
    Currencies {
        /// Text to search for, e.g. dollar
        query: Option<String>,
    },
    /// Show exchange rates from one currency to one or more others
    Rate {
        /// Currency to convert from, e.g. USD
        from: String,
        /// Currencies to convert to, e.g. GBP JPY
        #[arg(required = true)]
        to: Vec<String>,
    },
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert, e.g. 1,250.50
        #[arg(allow_hyphen_values = true)]
        amount: String,
        from: String,
        to: String,
    },
    /// Inspect or clear cached rates
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached rates
    List,
    /// Remove all cached rates
    Clear,
}

impl From<Commands> for fxrate::AppCommand {
    fn from(cmd: Commands) -> fxrate::AppCommand {
        match cmd {
            Commands::Currencies { query } => fxrate::AppCommand::Currencies { query },
            Commands::Rate { from, to } => fxrate::AppCommand::Rate { from, to },
            Commands::Convert { amount, from, to } => {
                fxrate::AppCommand::Convert { amount, from, to }
            }
            Commands::Cache {
                action: CacheAction::List,
            } => fxrate::AppCommand::CacheList,
            Commands::Cache {
                action: CacheAction::Clear,
            } => fxrate::AppCommand::CacheClear,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxrate::cli::setup::setup(),
        Some(cmd) => fxrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
