pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::RateResolver;
use crate::core::config::AppConfig;
use crate::providers::FixerProvider;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Lists the currency catalog. Needs neither config nor network.
    Currencies { query: Option<String> },
    Rate { from: String, to: Vec<String> },
    Convert { amount: String, from: String, to: String },
    CacheList,
    CacheClear,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxrate starting...");

    match command {
        AppCommand::Currencies { query } => cli::currencies::run(query.as_deref()),
        AppCommand::CacheList => {
            let config = load_config(config_path)?;
            cli::cache::list(&store::open_rate_cache(&config)).await
        }
        AppCommand::CacheClear => {
            let config = load_config(config_path)?;
            cli::cache::clear(&store::open_rate_cache(&config)).await
        }
        AppCommand::Rate { from, to } => {
            let config = load_config(config_path)?;
            let resolver =
                RateResolver::new(store::open_rate_cache(&config), build_provider(&config)?);
            cli::rate::run(&resolver, &from, &to).await
        }
        AppCommand::Convert { amount, from, to } => {
            let config = load_config(config_path)?;
            let resolver =
                RateResolver::new(store::open_rate_cache(&config), build_provider(&config)?);
            cli::convert::run(&resolver, &amount, &from, &to).await
        }
    }
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.provider.fixer.base_url,
        persist = config.cache.persist,
        "Loaded config"
    );
    Ok(config)
}

fn build_provider(config: &AppConfig) -> Result<FixerProvider> {
    FixerProvider::new(
        &config.provider.fixer.base_url,
        &config.access_key()?,
        config.request_timeout(),
    )
}
