//! Payment method reference data.
//!
//! Payment methods are attached to offers and pinned to a trade at creation
//! time; the method on an open trade is never re-selectable.

use super::ids::PaymentMethodId;
use super::money::Amount;

/// Broad payment rail classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethodKind {
    BankTransfer,
    CardPayment,
    MobileWallet,
    Cash,
    Other,
}

/// Per-method transfer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentLimits {
    pub min: Amount,
    pub max: Amount,
}

/// A payment method a maker accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub kind: PaymentMethodKind,
    /// Human-readable processing-time hint, e.g. "usually under 1 hour".
    pub processing_time: String,
    pub limits: PaymentLimits,
}

impl PaymentMethod {
    /// Whether the given amount falls inside this method's transfer limits.
    #[must_use]
    pub fn accepts_amount(&self, amount: Amount) -> bool {
        amount >= self.limits.min && amount <= self.limits.max
    }
}
