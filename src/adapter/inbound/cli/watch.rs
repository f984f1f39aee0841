//! `fxpeer watch`: follow a trade until it settles.

use std::sync::Arc;

use tracing::info;

use super::output;
use crate::adapter::outbound::{ConfigIdentity, HttpMarketplace};
use crate::app::TradeOrchestrator;
use crate::config::Config;
use crate::domain::{TradeId, UserId};
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::{LogNotifier, NotifierRegistry};

pub async fn run(config: Config, trade_id: &str) -> Result<()> {
    let user_id = config.api.user_id.clone().ok_or(Error::Config(
        ConfigError::MissingField {
            field: "api.user_id",
        },
    ))?;

    let api = Arc::new(HttpMarketplace::new(&config.api));
    let identity = Arc::new(ConfigIdentity::new(UserId::new(user_id)));
    let mut notifiers = NotifierRegistry::new();
    notifiers.register(Box::new(LogNotifier));

    let orchestrator = TradeOrchestrator::new(api, identity, notifiers, config.sync);

    let trade_id = TradeId::new(trade_id);
    let trade = orchestrator.resume_trade(&trade_id).await?;
    output::print_trade_status(&trade);

    if trade.status.is_terminal() {
        return Ok(());
    }

    let mut updates = orchestrator.watch_trade();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(trade) = updates.borrow_and_update().clone() else {
                    break;
                };
                output::print_trade_status(&trade);
                if trade.status.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                orchestrator.abandon();
                break;
            }
        }
    }

    Ok(())
}
