//! Builders for domain values used across tests.
//!
//! Concise factories so tests focus on assertions rather than construction
//! boilerplate. The canonical fixture is an offer by `maker-1` selling USD
//! for EUR with `min_trade = 100`, `max_trade = 5000` and
//! `available_amount = 3000`.

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use crate::domain::{
    Currency, CurrencyKind, Offer, OfferDraft, OfferId, OfferStatus, OnlineStatus, Participant,
    PaymentLimits, PaymentMethod, PaymentMethodId, PaymentMethodKind, PaymentWindow, Trade,
    TradeId, TradeStatus, UserId,
};
use crate::port::outbound::PaymentProofUpload;

/// USD or EUR currency records; anything else is a generic fiat currency.
pub fn currency(code: &str) -> Currency {
    match code {
        "USD" => Currency::new("USD", "US Dollar", "$", CurrencyKind::Fiat),
        "EUR" => Currency::new("EUR", "Euro", "€", CurrencyKind::Fiat),
        other => Currency::new(other, other, other, CurrencyKind::Fiat),
    }
}

/// A bank-transfer payment method with wide limits.
pub fn payment_method(id: &str) -> PaymentMethod {
    PaymentMethod {
        id: PaymentMethodId::new(id),
        name: "Bank transfer".into(),
        kind: PaymentMethodKind::BankTransfer,
        processing_time: "1-2 business days".into(),
        limits: PaymentLimits {
            min: dec!(10),
            max: dec!(100000),
        },
    }
}

/// A participant with the given id and trust score.
pub fn participant(id: &str, trust_score: u8) -> Participant {
    Participant {
        id: UserId::new(id),
        name: id.to_owned(),
        trust_score,
        completed_trades: 10,
        response_time: "replies within minutes".into(),
        online_status: OnlineStatus::Online,
    }
}

/// The canonical test offer (maker-1, USD→EUR, 100/5000/3000 bounds).
pub fn offer(id: &str) -> Offer {
    Offer {
        id: OfferId::new(id),
        maker: participant("maker-1", 91),
        sell_currency: currency("USD"),
        buy_currency: currency("EUR"),
        sell_amount: dec!(5000),
        buy_amount: dec!(4600.00),
        exchange_rate: dec!(0.92),
        margin_percent: dec!(1.5),
        payment_methods: vec![payment_method("pm-bank")],
        payment_window_minutes: 60,
        min_trade: dec!(100),
        max_trade: dec!(5000),
        available_amount: dec!(3000),
        status: OfferStatus::Active,
        kyc_required: false,
        terms: None,
        auto_reply_message: None,
        created_at: Utc::now(),
    }
}

/// A pending trade between `maker-1` and `taker-1`.
pub fn trade(id: &str) -> Trade {
    trade_with_status(id, TradeStatus::PendingAcceptance)
}

/// A `maker-1` / `taker-1` trade in the given status.
pub fn trade_with_status(id: &str, status: TradeStatus) -> Trade {
    trade_between(id, "maker-1", "taker-1", status)
}

/// A trade between arbitrary participants in the given status.
///
/// Statuses at or past `payment_sent` carry a payment-proof reference, as a
/// real backend record would.
pub fn trade_between(id: &str, maker: &str, taker: &str, status: TradeStatus) -> Trade {
    let now = Utc::now();
    let payment_proof_ref = match status {
        TradeStatus::PaymentSent
        | TradeStatus::PaymentConfirmed
        | TradeStatus::Completed => Some("proof-1".to_owned()),
        _ => None,
    };
    Trade {
        id: TradeId::new(id),
        offer_id: OfferId::new("o-1"),
        maker: participant(maker, 91),
        taker: participant(taker, 75),
        sell_currency: currency("USD"),
        buy_currency: currency("EUR"),
        sell_amount: dec!(2000),
        buy_amount: dec!(1840.00),
        exchange_rate: dec!(0.92),
        payment_method: payment_method("pm-bank"),
        escrow_amount: dec!(2000),
        escrow_currency: currency("USD"),
        status,
        created_at: now,
        quote_lock_expiry: now + Duration::minutes(15),
        payment_window: PaymentWindow {
            start: now,
            end: now + Duration::minutes(60),
        },
        chat_room_id: format!("trade-{id}"),
        payment_proof_ref,
        dispute_reason: None,
    }
}

/// A valid draft matching the canonical offer.
pub fn offer_draft() -> OfferDraft {
    OfferDraft {
        sell_currency: currency("USD"),
        buy_currency: currency("EUR"),
        sell_amount: dec!(5000),
        exchange_rate: dec!(0.92),
        margin_percent: dec!(1.5),
        payment_method_ids: vec![PaymentMethodId::new("pm-bank")],
        payment_window_minutes: 60,
        min_trade: dec!(100),
        max_trade: dec!(5000),
        kyc_required: false,
        terms: None,
        auto_reply_message: None,
    }
}

/// A small payment-proof upload.
pub fn proof_upload() -> PaymentProofUpload {
    PaymentProofUpload {
        file_name: "receipt.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
        note: Some("paid in full".into()),
    }
}
