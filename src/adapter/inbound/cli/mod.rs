//! Inbound CLI adapter.

pub mod command;
mod output;
mod watch;

use owo_colors::OwoColorize;

use crate::adapter::outbound::HttpMarketplace;
use crate::config::Config;
use crate::error::Result;
use crate::port::outbound::MarketplaceApi;

use command::{CheckCommand, Cli, Commands};

/// Dispatch a parsed CLI invocation.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check(CheckCommand::Config) => {
            // `load` validates as part of parsing.
            let _config = Config::load(&cli.config)?;
            if !cli.quiet {
                println!("{} {}", "ok".green().bold(), cli.config.display());
            }
            Ok(())
        }
        Commands::Offers => {
            let config = Config::load(&cli.config)?;
            config.init_logging();
            let api = HttpMarketplace::new(&config.api);
            let offers = api.fetch_offers().await?;
            output::print_offers(&offers);
            Ok(())
        }
        Commands::Watch(args) => {
            let config = Config::load(&cli.config)?;
            config.init_logging();
            watch::run(config, &args.trade_id).await
        }
    }
}
