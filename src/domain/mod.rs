//! Transport-agnostic domain model.
//!
//! Pure types and rules: currencies, payment methods, participants, offers,
//! trades and the trade lifecycle state machine. Nothing here imports the
//! async runtime or the HTTP stack.

mod currency;
mod error;
mod ids;
mod message;
mod money;
mod offer;
mod participant;
mod payment;
mod trade;

pub use currency::{Currency, CurrencyKind};
pub use error::TradeError;
pub use ids::{OfferId, PaymentMethodId, TradeId, UserId};
pub use message::{has_payment_proof, DisputeDetails, MessageKind, PaymentProof, TradeMessage};
pub use money::{derive_buy_amount, Amount, Rate, AMOUNT_SCALE};
pub use offer::{Offer, OfferDraft, OfferStatus};
pub use participant::{OnlineStatus, Participant, TrustBadge};
pub use payment::{PaymentLimits, PaymentMethod, PaymentMethodKind};
pub use trade::{
    ActorRule, PaymentWindow, StatusPresentation, Trade, TradeEvent, TradeRole, TradeStatus,
};
