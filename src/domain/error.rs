//! Trade validation errors.
//!
//! These are the rejections the orchestrator resolves locally, without a
//! network call. They are returned synchronously and carry enough structure
//! for a caller to present a specific message.

use thiserror::Error;

use super::ids::{PaymentMethodId, TradeId, UserId};
use super::money::Amount;
use super::trade::{TradeEvent, TradeRole, TradeStatus};

/// Errors raised by trade creation and transition validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    /// Requested amount is outside the offer's tradable bounds.
    #[error("amount {amount} outside offer bounds [{min}, {max}]")]
    InvalidAmount {
        amount: Amount,
        min: Amount,
        max: Amount,
    },

    /// The buyer already has a trade in a non-terminal status.
    #[error("user {user_id} already has active trade {blocking_trade}")]
    ConcurrentTradeLimitExceeded {
        user_id: UserId,
        blocking_trade: TradeId,
    },

    /// The requested event is not legal from the trade's current status.
    #[error("event {event:?} is not legal from status {from}")]
    IllegalTransition { from: TradeStatus, event: TradeEvent },

    /// The caller's role may not initiate the requested event.
    #[error("role {role} may not trigger {event:?}")]
    Unauthorized { event: TradeEvent, role: TradeRole },

    /// The caller is not a participant of the trade at all.
    #[error("user {user_id} is not a participant of trade {trade_id}")]
    NotParticipant { trade_id: TradeId, user_id: UserId },

    /// Payment confirmation requires a recorded payment proof.
    #[error("trade {trade_id} has no payment proof recorded")]
    PaymentProofRequired { trade_id: TradeId },

    /// The chosen payment method is not offered by the maker.
    #[error("payment method {method} is not offered")]
    PaymentMethodNotOffered { method: PaymentMethodId },

    /// Rating is only available once a trade is completed.
    #[error("cannot rate a trade in status {status}")]
    RatingUnavailable { status: TradeStatus },

    /// Rating score outside the accepted `1..=5` range.
    #[error("rating score {score} outside 1..=5")]
    InvalidRating { score: u8 },

    /// The trade is not the currently held trade of this session.
    #[error("trade {trade_id} is not the active trade of this session")]
    NotActiveTrade { trade_id: TradeId },

    /// An offer draft violates the offer invariants.
    #[error("invalid offer: {reason}")]
    InvalidOffer { reason: String },
}
