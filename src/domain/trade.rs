//! Trades and the trade lifecycle state machine.
//!
//! [`TradeStatus`] and [`TradeEvent`] encode the full legal transition table
//! for a trade. [`TradeStatus::apply`] is the single source of truth for
//! which transitions exist; everything else (orchestration guards, actor
//! checks, presentation) derives from it. Statuses the client may only
//! *observe* (an arbitration resolution, a server-side cancellation) arrive
//! through reconciliation and are not reachable through `apply`.

use chrono::{DateTime, Utc};

use super::currency::Currency;
use super::ids::{OfferId, TradeId, UserId};
use super::money::{Amount, Rate};
use super::participant::Participant;
use super::payment::PaymentMethod;

/// Lifecycle status of a trade.
///
/// The happy path runs `PendingAcceptance -> Accepted -> PaymentPending ->
/// PaymentSent -> PaymentConfirmed -> Completed`; `Disputed` and `Cancelled`
/// are side-branches. `Completed`, `Cancelled` and `Disputed` are terminal
/// for the client (dispute resolution happens in external arbitration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeStatus {
    /// Created by the taker, awaiting the maker's acceptance.
    PendingAcceptance,
    /// Maker accepted; escrow/quote is settling.
    Accepted,
    /// Escrow settled; the payer owes funds within the payment window.
    PaymentPending,
    /// Payer uploaded payment proof.
    PaymentSent,
    /// Payee confirmed receipt of funds.
    PaymentConfirmed,
    /// Release signed; funds delivered.
    Completed,
    /// A dispute was opened; resolution is external.
    Disputed,
    /// Cancelled before completion.
    Cancelled,
}

/// Transition-triggering events a participant (or the backend) can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeEvent {
    /// Maker accepts a pending trade.
    Accept,
    /// Either party cancels a pending trade.
    Cancel,
    /// Escrow/quote settled; backend-driven, never client-initiated.
    EscrowSettled,
    /// Payer uploads payment proof.
    PaymentSent,
    /// Payee confirms receipt.
    ConfirmPayment,
    /// Payee (or backend) signs the release.
    Release,
    /// Either party opens a dispute.
    OpenDispute,
}

/// Which participant role may initiate a given event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRule {
    MakerOnly,
    TakerOnly,
    Either,
    /// Backend-driven transition; no client role may initiate it.
    System,
}

impl ActorRule {
    /// Whether the given role satisfies this rule.
    #[must_use]
    pub fn permits(self, role: TradeRole) -> bool {
        match self {
            ActorRule::MakerOnly => role == TradeRole::Maker,
            ActorRule::TakerOnly => role == TradeRole::Taker,
            ActorRule::Either => true,
            ActorRule::System => false,
        }
    }
}

/// The side of a trade the authenticated user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeRole {
    /// Published the offer the trade was created against.
    Maker,
    /// Initiated the trade against an existing offer.
    Taker,
}

impl std::fmt::Display for TradeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeRole::Maker => write!(f, "maker"),
            TradeRole::Taker => write!(f, "taker"),
        }
    }
}

impl TradeStatus {
    /// The status this event moves a trade to, or `None` when the event is
    /// not legal from `self`. This is the canonical transition table.
    #[must_use]
    pub fn apply(self, event: TradeEvent) -> Option<TradeStatus> {
        use TradeEvent as E;
        use TradeStatus as S;

        match (self, event) {
            (S::PendingAcceptance, E::Accept) => Some(S::Accepted),
            (S::PendingAcceptance, E::Cancel) => Some(S::Cancelled),
            (S::Accepted, E::EscrowSettled) => Some(S::PaymentPending),
            (S::PaymentPending, E::PaymentSent) => Some(S::PaymentSent),
            (S::PaymentSent, E::ConfirmPayment) => Some(S::PaymentConfirmed),
            (S::PaymentConfirmed, E::Release) => Some(S::Completed),
            (from, E::OpenDispute) if !from.is_terminal() => Some(S::Disputed),
            _ => None,
        }
    }

    /// Which role may initiate `event`. In the default offer direction the
    /// taker owes funds (payer) and the maker receives them (payee).
    #[must_use]
    pub fn required_actor(event: TradeEvent) -> ActorRule {
        match event {
            TradeEvent::Accept => ActorRule::MakerOnly,
            TradeEvent::Cancel => ActorRule::Either,
            TradeEvent::EscrowSettled => ActorRule::System,
            TradeEvent::PaymentSent => ActorRule::TakerOnly,
            TradeEvent::ConfirmPayment => ActorRule::MakerOnly,
            TradeEvent::Release => ActorRule::MakerOnly,
            TradeEvent::OpenDispute => ActorRule::Either,
        }
    }

    /// Terminal statuses accept no further client-visible transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TradeStatus::Completed | TradeStatus::Cancelled | TradeStatus::Disputed
        )
    }

    /// Whether the backend may still move this trade, i.e. whether the
    /// synchronization loop should keep polling it.
    #[must_use]
    pub fn is_settling(self) -> bool {
        !self.is_terminal()
    }

    /// Canonical wire name.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            TradeStatus::PendingAcceptance => "pending_acceptance",
            TradeStatus::Accepted => "accepted",
            TradeStatus::PaymentPending => "payment_pending",
            TradeStatus::PaymentSent => "payment_sent",
            TradeStatus::PaymentConfirmed => "payment_confirmed",
            TradeStatus::Completed => "completed",
            TradeStatus::Disputed => "disputed",
            TradeStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a wire status name.
    ///
    /// `"pending"` is a legacy alias for `pending_acceptance`; it is accepted
    /// on input and never emitted.
    #[must_use]
    pub fn parse_wire(value: &str) -> Option<TradeStatus> {
        match value {
            "pending_acceptance" | "pending" => Some(TradeStatus::PendingAcceptance),
            "accepted" => Some(TradeStatus::Accepted),
            "payment_pending" => Some(TradeStatus::PaymentPending),
            "payment_sent" => Some(TradeStatus::PaymentSent),
            "payment_confirmed" => Some(TradeStatus::PaymentConfirmed),
            "completed" => Some(TradeStatus::Completed),
            "disputed" => Some(TradeStatus::Disputed),
            "cancelled" => Some(TradeStatus::Cancelled),
            _ => None,
        }
    }

    /// Presentation hints for this status.
    ///
    /// A single lookup table, fed by the canonical status, so UI surfaces
    /// cannot each grow their own status-to-copy mapping.
    #[must_use]
    pub fn presentation(self) -> StatusPresentation {
        match self {
            TradeStatus::PendingAcceptance => StatusPresentation {
                headline: "Awaiting acceptance",
                detail: "The maker has not accepted this trade yet.",
                awaiting: Some(ActorRule::MakerOnly),
            },
            TradeStatus::Accepted => StatusPresentation {
                headline: "Accepted",
                detail: "Escrow is settling; payment opens shortly.",
                awaiting: Some(ActorRule::System),
            },
            TradeStatus::PaymentPending => StatusPresentation {
                headline: "Payment due",
                detail: "The buyer must send payment within the payment window.",
                awaiting: Some(ActorRule::TakerOnly),
            },
            TradeStatus::PaymentSent => StatusPresentation {
                headline: "Payment sent",
                detail: "Waiting for the seller to confirm receipt.",
                awaiting: Some(ActorRule::MakerOnly),
            },
            TradeStatus::PaymentConfirmed => StatusPresentation {
                headline: "Payment confirmed",
                detail: "Funds release is being signed.",
                awaiting: Some(ActorRule::MakerOnly),
            },
            TradeStatus::Completed => StatusPresentation {
                headline: "Completed",
                detail: "Funds released. You can rate your counterparty.",
                awaiting: None,
            },
            TradeStatus::Disputed => StatusPresentation {
                headline: "In dispute",
                detail: "An arbitrator is reviewing this trade.",
                awaiting: None,
            },
            TradeStatus::Cancelled => StatusPresentation {
                headline: "Cancelled",
                detail: "This trade was cancelled before completion.",
                awaiting: None,
            },
        }
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

/// Presentation hints for a trade status, consumed by UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub headline: &'static str,
    pub detail: &'static str,
    /// Whose move it is, if anyone's.
    pub awaiting: Option<ActorRule>,
}

/// The window within which the payer must submit payment proof.
///
/// Derived once at trade creation and never silently extended. Advisory for
/// display only; expiry enforcement belongs to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A trade between a maker and a taker, created against an offer.
///
/// Trades are assembled wholesale from authoritative backend responses; the
/// client never constructs one from scratch or mutates fields other than by
/// replacing the whole record through orchestrated transitions and
/// reconciliation. Amount bounds are enforced at creation only; the locked
/// amount does not change after creation even if the offer's availability
/// shrinks.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: TradeId,
    pub offer_id: OfferId,
    pub maker: Participant,
    pub taker: Participant,
    pub sell_currency: Currency,
    pub buy_currency: Currency,
    pub sell_amount: Amount,
    pub buy_amount: Amount,
    pub exchange_rate: Rate,
    /// Pinned at creation; not re-selectable later.
    pub payment_method: PaymentMethod,
    pub escrow_amount: Amount,
    pub escrow_currency: Currency,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
    /// Rate guarantee deadline, derived once at creation.
    pub quote_lock_expiry: DateTime<Utc>,
    pub payment_window: PaymentWindow,
    pub chat_room_id: String,
    /// Reference to the uploaded payment proof, once supplied.
    pub payment_proof_ref: Option<String>,
    pub dispute_reason: Option<String>,
}

impl Trade {
    /// The role `user` plays in this trade, if they participate at all.
    #[must_use]
    pub fn role_of(&self, user: &UserId) -> Option<TradeRole> {
        if self.maker.id == *user {
            Some(TradeRole::Maker)
        } else if self.taker.id == *user {
            Some(TradeRole::Taker)
        } else {
            None
        }
    }

    /// Whether payment proof has been recorded for this trade.
    #[must_use]
    pub fn has_payment_proof(&self) -> bool {
        self.payment_proof_ref.is_some()
    }

    /// Counterparty of `role`.
    #[must_use]
    pub fn counterparty(&self, role: TradeRole) -> &Participant {
        match role {
            TradeRole::Maker => &self.taker,
            TradeRole::Taker => &self.maker,
        }
    }
}
