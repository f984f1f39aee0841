//! Trade message log types.
//!
//! Messages form an append-only log attached to a trade. The log itself is
//! not state-bearing for orchestration, but the presence of a payment-proof
//! message gates payment confirmation.

use chrono::{DateTime, Utc};

use super::ids::{TradeId, UserId};

/// Classification of a trade message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Generated by the backend (status changes, reminders).
    System,
    /// Free-form chat from a participant.
    User,
    /// Carries an uploaded payment proof.
    PaymentProof,
    /// Carries dispute details.
    Dispute,
}

/// An uploaded payment-proof attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    /// Backend-assigned reference to the stored document.
    pub reference: String,
    pub file_name: String,
    pub content_type: String,
}

/// Dispute details attached to a dispute message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisputeDetails {
    pub reason: String,
    pub opened_by: UserId,
}

/// One entry in a trade's message log.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeMessage {
    pub id: String,
    pub trade_id: TradeId,
    pub kind: MessageKind,
    /// Absent for system messages.
    pub sender_id: Option<UserId>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub payment_proof: Option<PaymentProof>,
    pub dispute: Option<DisputeDetails>,
}

impl TradeMessage {
    /// Whether this message records a payment proof.
    #[must_use]
    pub fn is_payment_proof(&self) -> bool {
        self.kind == MessageKind::PaymentProof
    }
}

/// Whether any message in the log records a payment proof.
#[must_use]
pub fn has_payment_proof(messages: &[TradeMessage]) -> bool {
    messages.iter().any(TradeMessage::is_payment_proof)
}
