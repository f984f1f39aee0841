//! Wire types for the marketplace REST API.
//!
//! The backend is inconsistent about participant naming (`merchant` vs
//! `maker`, `buyer` vs `taker`) and omits several optional fields. All of
//! that is absorbed here: domain code only ever sees canonical `maker` /
//! `taker` records with every field populated.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Currency, CurrencyKind, DisputeDetails, MessageKind, Offer, OfferDraft, OfferId, OnlineStatus,
    Participant, PaymentLimits, PaymentMethod, PaymentMethodId, PaymentProof, PaymentWindow,
    Trade, TradeId, TradeMessage, TradeStatus, UserId,
};
use crate::error::TransportError;

/// Uniform response envelope used by every backend endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope into its payload or a typed transport error.
    pub fn into_data(self, resource: &str) -> Result<T, TransportError> {
        if !self.success {
            return Err(TransportError::Api {
                message: self
                    .error
                    .unwrap_or_else(|| "unspecified backend error".into()),
            });
        }
        self.data
            .ok_or_else(|| TransportError::Decode(format!("missing data for {resource}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct CurrencyDto {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    pub kind: String,
}

impl TryFrom<CurrencyDto> for Currency {
    type Error = TransportError;

    fn try_from(dto: CurrencyDto) -> Result<Self, Self::Error> {
        let kind = match dto.kind.as_str() {
            "fiat" => CurrencyKind::Fiat,
            "crypto" => CurrencyKind::Crypto,
            other => {
                return Err(TransportError::Decode(format!(
                    "unknown currency kind '{other}'"
                )))
            }
        };
        Ok(Currency {
            code: dto.code,
            name: dto.name,
            symbol: dto.symbol,
            kind,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitsDto {
    #[serde(default)]
    pub min: Decimal,
    #[serde(default)]
    pub max: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    /// The backend has used both names for this field.
    #[serde(default, alias = "processing_time_description")]
    pub processing_time: String,
    #[serde(default)]
    pub limits: Option<LimitsDto>,
}

impl From<PaymentMethodDto> for PaymentMethod {
    fn from(dto: PaymentMethodDto) -> Self {
        let kind = match dto.kind.as_str() {
            "bank_transfer" => crate::domain::PaymentMethodKind::BankTransfer,
            "card_payment" => crate::domain::PaymentMethodKind::CardPayment,
            "mobile_wallet" => crate::domain::PaymentMethodKind::MobileWallet,
            "cash" => crate::domain::PaymentMethodKind::Cash,
            _ => crate::domain::PaymentMethodKind::Other,
        };
        let limits = dto.limits.map_or(
            PaymentLimits {
                min: Decimal::ZERO,
                max: Decimal::MAX,
            },
            |l| PaymentLimits { min: l.min, max: l.max },
        );
        PaymentMethod {
            id: PaymentMethodId::new(dto.id),
            name: dto.name,
            kind,
            processing_time: dto.processing_time,
            limits,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub trust_score: u8,
    #[serde(default)]
    pub completed_trades: u32,
    #[serde(default, alias = "response_time_description")]
    pub response_time: String,
    #[serde(default)]
    pub online_status: Option<String>,
}

impl From<ParticipantDto> for Participant {
    fn from(dto: ParticipantDto) -> Self {
        let online_status = match dto.online_status.as_deref() {
            Some("online") => OnlineStatus::Online,
            Some("away") => OnlineStatus::Away,
            _ => OnlineStatus::Offline,
        };
        Participant {
            id: UserId::new(dto.id),
            name: dto.name,
            trust_score: dto.trust_score.min(100),
            completed_trades: dto.completed_trades,
            response_time: dto.response_time,
            online_status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OfferDto {
    pub id: String,
    /// Canonical name is `maker`; older backend revisions say `merchant`.
    #[serde(alias = "merchant")]
    pub maker: ParticipantDto,
    pub sell_currency: CurrencyDto,
    pub buy_currency: CurrencyDto,
    pub sell_amount: Decimal,
    pub buy_amount: Decimal,
    pub exchange_rate: Decimal,
    #[serde(default)]
    pub margin_percent: Decimal,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethodDto>,
    #[serde(default = "default_payment_window_minutes")]
    pub payment_window_minutes: u32,
    pub min_trade: Decimal,
    pub max_trade: Decimal,
    #[serde(default)]
    pub available_amount: Option<Decimal>,
    pub status: String,
    #[serde(default)]
    pub kyc_required: bool,
    #[serde(default)]
    pub terms: Option<String>,
    #[serde(default)]
    pub auto_reply_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_payment_window_minutes() -> u32 {
    30
}

impl TryFrom<OfferDto> for Offer {
    type Error = TransportError;

    fn try_from(dto: OfferDto) -> Result<Self, Self::Error> {
        let status = match dto.status.as_str() {
            "active" => crate::domain::OfferStatus::Active,
            "paused" => crate::domain::OfferStatus::Paused,
            "completed" => crate::domain::OfferStatus::Completed,
            "cancelled" => crate::domain::OfferStatus::Cancelled,
            other => {
                return Err(TransportError::Decode(format!(
                    "unknown offer status '{other}'"
                )))
            }
        };
        Ok(Offer {
            id: OfferId::new(dto.id),
            maker: dto.maker.into(),
            sell_currency: dto.sell_currency.try_into()?,
            buy_currency: dto.buy_currency.try_into()?,
            sell_amount: dto.sell_amount,
            buy_amount: dto.buy_amount,
            exchange_rate: dto.exchange_rate,
            margin_percent: dto.margin_percent,
            payment_methods: dto.payment_methods.into_iter().map(Into::into).collect(),
            payment_window_minutes: dto.payment_window_minutes,
            min_trade: dto.min_trade,
            max_trade: dto.max_trade,
            // A fresh offer that omits availability has consumed nothing.
            available_amount: dto.available_amount.unwrap_or(dto.sell_amount),
            status,
            kyc_required: dto.kyc_required,
            terms: dto.terms,
            auto_reply_message: dto.auto_reply_message,
            created_at: dto.created_at.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentWindowDto {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TradeDto {
    pub id: String,
    pub offer_id: String,
    #[serde(alias = "merchant")]
    pub maker: ParticipantDto,
    #[serde(alias = "buyer")]
    pub taker: ParticipantDto,
    pub sell_currency: CurrencyDto,
    pub buy_currency: CurrencyDto,
    pub sell_amount: Decimal,
    pub buy_amount: Decimal,
    pub exchange_rate: Decimal,
    pub payment_method: PaymentMethodDto,
    #[serde(default)]
    pub escrow_amount: Option<Decimal>,
    #[serde(default)]
    pub escrow_currency: Option<CurrencyDto>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub quote_lock_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_window: Option<PaymentWindowDto>,
    #[serde(default = "default_payment_window_minutes")]
    pub payment_window_minutes: u32,
    #[serde(default)]
    pub chat_room_id: Option<String>,
    #[serde(default)]
    pub payment_proof_ref: Option<String>,
    #[serde(default)]
    pub dispute_reason: Option<String>,
}

impl TryFrom<TradeDto> for Trade {
    type Error = TransportError;

    fn try_from(dto: TradeDto) -> Result<Self, Self::Error> {
        let status = TradeStatus::parse_wire(&dto.status).ok_or_else(|| {
            TransportError::Decode(format!("unknown trade status '{}'", dto.status))
        })?;

        let sell_currency: Currency = dto.sell_currency.try_into()?;
        // Escrow defaults: notionally the maker's sell-side funds.
        let escrow_currency = match dto.escrow_currency {
            Some(c) => c.try_into()?,
            None => sell_currency.clone(),
        };
        let payment_window = match dto.payment_window {
            Some(w) => PaymentWindow {
                start: w.start,
                end: w.end,
            },
            None => PaymentWindow {
                start: dto.created_at,
                end: dto.created_at + Duration::minutes(i64::from(dto.payment_window_minutes)),
            },
        };
        let chat_room_id = dto
            .chat_room_id
            .unwrap_or_else(|| format!("trade-{}", dto.id));

        Ok(Trade {
            id: TradeId::new(dto.id),
            offer_id: OfferId::new(dto.offer_id),
            maker: dto.maker.into(),
            taker: dto.taker.into(),
            sell_currency,
            buy_currency: dto.buy_currency.try_into()?,
            sell_amount: dto.sell_amount,
            buy_amount: dto.buy_amount,
            exchange_rate: dto.exchange_rate,
            payment_method: dto.payment_method.into(),
            escrow_amount: dto.escrow_amount.unwrap_or(dto.sell_amount),
            escrow_currency,
            status,
            created_at: dto.created_at,
            quote_lock_expiry: dto.quote_lock_expiry.unwrap_or(dto.created_at),
            payment_window,
            chat_room_id,
            payment_proof_ref: dto.payment_proof_ref,
            dispute_reason: dto.dispute_reason,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProofRefDto {
    pub reference: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
pub struct DisputeDto {
    pub reason: String,
    pub opened_by: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub trade_id: String,
    pub kind: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub payment_proof: Option<ProofRefDto>,
    #[serde(default)]
    pub dispute: Option<DisputeDto>,
}

impl From<MessageDto> for TradeMessage {
    fn from(dto: MessageDto) -> Self {
        // The message log is informational; unknown kinds degrade to system
        // entries instead of failing the whole fetch.
        let kind = match dto.kind.as_str() {
            "user" => MessageKind::User,
            "payment_proof" => MessageKind::PaymentProof,
            "dispute" => MessageKind::Dispute,
            _ => MessageKind::System,
        };
        TradeMessage {
            id: dto.id,
            trade_id: TradeId::new(dto.trade_id),
            kind,
            sender_id: dto.sender_id.map(UserId::new),
            content: dto.content,
            timestamp: dto.timestamp,
            payment_proof: dto.payment_proof.map(|p| PaymentProof {
                reference: p.reference,
                file_name: p.file_name,
                content_type: p.content_type,
            }),
            dispute: dto.dispute.map(|d| DisputeDetails {
                reason: d.reason,
                opened_by: UserId::new(d.opened_by),
            }),
        }
    }
}

/// Request body for `POST /offers`.
#[derive(Debug, Serialize)]
pub struct CreateOfferBody {
    pub sell_currency: String,
    pub buy_currency: String,
    pub sell_amount: Decimal,
    pub buy_amount: Decimal,
    pub exchange_rate: Decimal,
    pub margin_percent: Decimal,
    pub payment_method_ids: Vec<String>,
    pub payment_window_minutes: u32,
    pub min_trade: Decimal,
    pub max_trade: Decimal,
    pub kyc_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_message: Option<String>,
}

impl From<&OfferDraft> for CreateOfferBody {
    fn from(draft: &OfferDraft) -> Self {
        Self {
            sell_currency: draft.sell_currency.code.clone(),
            buy_currency: draft.buy_currency.code.clone(),
            sell_amount: draft.sell_amount,
            buy_amount: draft.buy_amount(),
            exchange_rate: draft.exchange_rate,
            margin_percent: draft.margin_percent,
            payment_method_ids: draft
                .payment_method_ids
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            payment_window_minutes: draft.payment_window_minutes,
            min_trade: draft.min_trade,
            max_trade: draft.max_trade,
            kyc_required: draft.kyc_required,
            terms: draft.terms.clone(),
            auto_reply_message: draft.auto_reply_message.clone(),
        }
    }
}

/// Request body for `POST /offers/{id}/trade`.
#[derive(Debug, Serialize)]
pub struct CreateTradeBody {
    pub amount: Decimal,
    pub payment_method_id: String,
}

/// Request body for `POST /trades/{id}/dispute`.
#[derive(Debug, Serialize)]
pub struct DisputeBody {
    pub reason: String,
}

/// Request body for `POST /trades/{id}/rating`.
#[derive(Debug, Serialize)]
pub struct RatingBody {
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PARTICIPANT: &str = r#"{
        "id": "u-1",
        "name": "Alice",
        "trust_score": 92,
        "completed_trades": 10,
        "response_time": "fast",
        "online_status": "online"
    }"#;

    fn trade_json(maker_key: &str, taker_key: &str, status: &str) -> String {
        format!(
            r#"{{
                "id": "t-1",
                "offer_id": "o-1",
                "{maker_key}": {PARTICIPANT},
                "{taker_key}": {PARTICIPANT},
                "sell_currency": {{"code": "USD", "kind": "fiat"}},
                "buy_currency": {{"code": "EUR", "kind": "fiat"}},
                "sell_amount": "1000",
                "buy_amount": "920.00",
                "exchange_rate": "0.92",
                "payment_method": {{"id": "pm-1", "name": "Bank transfer"}},
                "status": "{status}",
                "created_at": "2026-01-10T12:00:00Z"
            }}"#
        )
    }

    #[test]
    fn trade_accepts_canonical_participant_names() {
        let dto: TradeDto = serde_json::from_str(&trade_json("maker", "taker", "accepted")).unwrap();
        let trade: Trade = dto.try_into().unwrap();
        assert_eq!(trade.status, TradeStatus::Accepted);
        assert_eq!(trade.maker.id.as_str(), "u-1");
    }

    #[test]
    fn trade_accepts_legacy_merchant_and_buyer_names() {
        let dto: TradeDto =
            serde_json::from_str(&trade_json("merchant", "buyer", "payment_sent")).unwrap();
        let trade: Trade = dto.try_into().unwrap();
        assert_eq!(trade.status, TradeStatus::PaymentSent);
        assert_eq!(trade.taker.name, "Alice");
    }

    #[test]
    fn trade_legacy_pending_status_maps_to_pending_acceptance() {
        let dto: TradeDto = serde_json::from_str(&trade_json("maker", "taker", "pending")).unwrap();
        let trade: Trade = dto.try_into().unwrap();
        assert_eq!(trade.status, TradeStatus::PendingAcceptance);
    }

    #[test]
    fn trade_unknown_status_is_a_decode_error() {
        let dto: TradeDto = serde_json::from_str(&trade_json("maker", "taker", "limbo")).unwrap();
        let err = Trade::try_from(dto).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn trade_missing_optionals_get_safe_placeholders() {
        let dto: TradeDto = serde_json::from_str(&trade_json("maker", "taker", "accepted")).unwrap();
        let trade: Trade = dto.try_into().unwrap();
        // Escrow defaults to the sell side.
        assert_eq!(trade.escrow_amount, dec!(1000));
        assert_eq!(trade.escrow_currency.code, "USD");
        // Chat room id is derived from the trade id.
        assert_eq!(trade.chat_room_id, "trade-t-1");
        // Payment window derived from created_at + default minutes.
        assert_eq!(
            (trade.payment_window.end - trade.payment_window.start).num_minutes(),
            30
        );
    }

    #[test]
    fn envelope_failure_maps_to_api_error() {
        let envelope: Envelope<Vec<String>> = serde_json::from_str(
            r#"{"success": false, "error": "quota exceeded"}"#,
        )
        .unwrap();
        let err = envelope.into_data("offers").unwrap_err();
        match err {
            TransportError::Api { message } => assert_eq!(message, "quota exceeded"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn envelope_success_without_data_is_a_decode_error() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            envelope.into_data("offers").unwrap_err(),
            TransportError::Decode(_)
        ));
    }

    #[test]
    fn offer_availability_defaults_to_sell_amount() {
        let json = format!(
            r#"{{
                "id": "o-1",
                "merchant": {PARTICIPANT},
                "sell_currency": {{"code": "USD", "kind": "fiat"}},
                "buy_currency": {{"code": "EUR", "kind": "fiat"}},
                "sell_amount": "5000",
                "buy_amount": "4600.00",
                "exchange_rate": "0.92",
                "min_trade": "100",
                "max_trade": "5000",
                "status": "active"
            }}"#
        );
        let dto: OfferDto = serde_json::from_str(&json).unwrap();
        let offer: Offer = dto.try_into().unwrap();
        assert_eq!(offer.available_amount, dec!(5000));
        assert_eq!(offer.maker.trust_score, 92);
        assert!(offer.check_invariants().is_ok());
    }

    #[test]
    fn message_unknown_kind_degrades_to_system() {
        let json = r#"{
            "id": "m-1",
            "trade_id": "t-1",
            "kind": "weird",
            "timestamp": "2026-01-10T12:00:00Z"
        }"#;
        let dto: MessageDto = serde_json::from_str(json).unwrap();
        let message: TradeMessage = dto.into();
        assert_eq!(message.kind, MessageKind::System);
        assert!(message.sender_id.is_none());
    }

    #[test]
    fn message_payment_proof_payload() {
        let json = r#"{
            "id": "m-2",
            "trade_id": "t-1",
            "kind": "payment_proof",
            "sender_id": "u-2",
            "content": "receipt attached",
            "timestamp": "2026-01-10T12:00:00Z",
            "payment_proof": {"reference": "doc-9", "file_name": "receipt.png", "content_type": "image/png"}
        }"#;
        let message: TradeMessage = serde_json::from_str::<MessageDto>(json).unwrap().into();
        assert!(message.is_payment_proof());
        assert_eq!(message.payment_proof.unwrap().reference, "doc-9");
    }
}
