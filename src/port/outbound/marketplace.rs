//! Marketplace transport port.
//!
//! The trait the orchestration engine speaks to the backend through. The
//! HTTP adapter implements it against the REST API; the testkit provides a
//! scripted in-memory implementation.

use async_trait::async_trait;

use crate::domain::{
    Amount, Offer, OfferDraft, OfferId, PaymentMethodId, Trade, TradeId, TradeMessage,
};
use crate::error::TransportError;

/// Parameters for creating a trade against an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    /// Amount of the offer's sell currency to lock.
    pub amount: Amount,
    /// One of the offer's payment methods; pinned to the trade.
    pub payment_method_id: PaymentMethodId,
}

/// A status-transition command, mapped by the adapter onto the backend's
/// transition endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionCommand {
    Accept,
    PaymentSent,
    ConfirmPayment,
    Complete,
    Cancel,
    Dispute { reason: String },
}

impl TransitionCommand {
    /// Endpoint path segment for this command.
    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        match self {
            TransitionCommand::Accept => "accept",
            TransitionCommand::PaymentSent => "payment-sent",
            TransitionCommand::ConfirmPayment => "confirm-payment",
            TransitionCommand::Complete => "complete",
            TransitionCommand::Cancel => "cancel",
            TransitionCommand::Dispute { .. } => "dispute",
        }
    }
}

/// A payment-proof document to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProofUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Optional free-form note shown to the counterparty.
    pub note: Option<String>,
}

/// A counterparty rating for a completed trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRating {
    /// Score in `1..=5`.
    pub score: u8,
    pub comment: Option<String>,
}

/// Client interface to the marketplace backend.
///
/// All methods are request/response over an unreliable transport; a returned
/// error carries no guarantee about whether the backend applied the call.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Fetch currently published offers.
    async fn fetch_offers(&self) -> Result<Vec<Offer>, TransportError>;

    /// Publish a new offer as the authenticated maker.
    async fn publish_offer(&self, draft: &OfferDraft) -> Result<Offer, TransportError>;

    /// Create a trade against an offer. The returned trade is authoritative.
    async fn create_trade(
        &self,
        offer_id: &OfferId,
        request: &TradeRequest,
    ) -> Result<Trade, TransportError>;

    /// Fetch all trades visible to the authenticated user.
    async fn fetch_trades(&self) -> Result<Vec<Trade>, TransportError>;

    /// Fetch one trade by id.
    async fn fetch_trade(&self, id: &TradeId) -> Result<Trade, TransportError>;

    /// Fetch the message log for a trade.
    async fn fetch_messages(&self, id: &TradeId) -> Result<Vec<TradeMessage>, TransportError>;

    /// Request a status transition. Returns the trade as the backend sees it
    /// after the transition.
    async fn submit_transition(
        &self,
        id: &TradeId,
        command: &TransitionCommand,
    ) -> Result<Trade, TransportError>;

    /// Upload a payment proof. The backend records a proof message and moves
    /// the trade to `payment_sent`; the updated trade is returned.
    async fn upload_payment_proof(
        &self,
        id: &TradeId,
        proof: &PaymentProofUpload,
    ) -> Result<Trade, TransportError>;

    /// Submit a rating for a completed trade.
    async fn submit_rating(
        &self,
        id: &TradeId,
        rating: &TradeRating,
    ) -> Result<(), TransportError>;
}

impl TradeRating {
    /// Build a rating, validating the score range.
    pub fn new(score: u8, comment: Option<String>) -> Result<Self, crate::domain::TradeError> {
        if !(1..=5).contains(&score) {
            return Err(crate::domain::TradeError::InvalidRating { score });
        }
        Ok(Self { score, comment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_endpoints() {
        assert_eq!(TransitionCommand::Accept.endpoint(), "accept");
        assert_eq!(TransitionCommand::PaymentSent.endpoint(), "payment-sent");
        assert_eq!(
            TransitionCommand::ConfirmPayment.endpoint(),
            "confirm-payment"
        );
        assert_eq!(TransitionCommand::Complete.endpoint(), "complete");
        assert_eq!(TransitionCommand::Cancel.endpoint(), "cancel");
        assert_eq!(
            TransitionCommand::Dispute {
                reason: "no payment".into()
            }
            .endpoint(),
            "dispute"
        );
    }

    #[test]
    fn rating_score_bounds() {
        assert!(TradeRating::new(0, None).is_err());
        assert!(TradeRating::new(6, None).is_err());
        assert!(TradeRating::new(1, None).is_ok());
        assert!(TradeRating::new(5, Some("great".into())).is_ok());
    }
}
