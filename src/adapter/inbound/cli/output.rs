//! Terminal rendering for CLI commands.

use owo_colors::OwoColorize;
use tabled::{settings::Style, Table, Tabled};

use crate::domain::{Offer, Trade, TradeStatus};

#[derive(Tabled)]
pub struct OfferRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Maker")]
    maker: String,
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Bounds")]
    bounds: String,
}

impl From<&Offer> for OfferRow {
    fn from(offer: &Offer) -> Self {
        let badge = offer
            .maker
            .trust_badge()
            .map(|b| format!(" [{b}]"))
            .unwrap_or_default();
        Self {
            id: offer.id.to_string(),
            maker: format!("{}{badge}", offer.maker.name),
            pair: format!("{}/{}", offer.sell_currency, offer.buy_currency),
            rate: offer.exchange_rate.to_string(),
            available: format!("{} {}", offer.available_amount, offer.sell_currency),
            bounds: format!("{}..{}", offer.min_trade, offer.tradable_max()),
        }
    }
}

/// Render the offers table.
pub fn print_offers(offers: &[Offer]) {
    if offers.is_empty() {
        println!("{}", "No offers published.".dimmed());
        return;
    }
    let rows: Vec<OfferRow> = offers.iter().map(Into::into).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

/// Render one status line for a trade, colored by lifecycle phase.
pub fn print_trade_status(trade: &Trade) {
    let hint = trade.status.presentation();
    let headline = match trade.status {
        TradeStatus::Completed => hint.headline.green().to_string(),
        TradeStatus::Disputed | TradeStatus::Cancelled => hint.headline.red().to_string(),
        _ => hint.headline.yellow().to_string(),
    };
    println!(
        "{} {} - {} ({} {} @ {})",
        trade.id.to_string().bold(),
        headline,
        hint.detail,
        trade.sell_amount,
        trade.sell_currency,
        trade.exchange_rate
    );
}
