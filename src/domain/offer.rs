//! Offers and offer validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::currency::Currency;
use super::error::TradeError;
use super::ids::{OfferId, PaymentMethodId};
use super::money::{derive_buy_amount, Amount, Rate};
use super::participant::Participant;
use super::payment::PaymentMethod;

/// Publication status of an offer. Offers are never physically deleted;
/// deactivation is a status change owned by the maker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl OfferStatus {
    /// Whether new trades may be created against the offer.
    #[must_use]
    pub fn accepts_trades(self) -> bool {
        self == OfferStatus::Active
    }
}

/// A published currency-exchange offer.
///
/// Invariant: `min_trade <= max_trade <= available_amount <= sell_amount`
/// holds at creation and after every trade that consumes availability, and
/// `buy_amount == round(sell_amount * exchange_rate)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub maker: Participant,
    pub sell_currency: Currency,
    pub buy_currency: Currency,
    pub sell_amount: Amount,
    pub buy_amount: Amount,
    pub exchange_rate: Rate,
    pub margin_percent: Decimal,
    pub payment_methods: Vec<PaymentMethod>,
    pub payment_window_minutes: u32,
    pub min_trade: Amount,
    pub max_trade: Amount,
    /// Remaining sellable amount; shrinks as trades consume it.
    pub available_amount: Amount,
    pub status: OfferStatus,
    pub kyc_required: bool,
    pub terms: Option<String>,
    pub auto_reply_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Upper bound a new trade may lock right now.
    #[must_use]
    pub fn tradable_max(&self) -> Amount {
        self.max_trade.min(self.available_amount)
    }

    /// Validate a requested trade amount against this offer's bounds.
    ///
    /// Bounds are `[min_trade, min(max_trade, available_amount)]`, checked at
    /// creation time only.
    pub fn validate_amount(&self, amount: Amount) -> Result<(), TradeError> {
        let min = self.min_trade;
        let max = self.tradable_max();
        if amount < min || amount > max {
            return Err(TradeError::InvalidAmount { amount, min, max });
        }
        Ok(())
    }

    /// Look up one of the maker's accepted payment methods.
    pub fn payment_method(&self, id: &PaymentMethodId) -> Result<&PaymentMethod, TradeError> {
        self.payment_methods
            .iter()
            .find(|m| m.id == *id)
            .ok_or_else(|| TradeError::PaymentMethodNotOffered { method: id.clone() })
    }

    /// Check the structural offer invariant. Server-supplied offers are
    /// expected to satisfy it; a violation indicates a backend bug worth
    /// surfacing rather than silently trading against.
    pub fn check_invariants(&self) -> Result<(), TradeError> {
        if self.min_trade > self.max_trade {
            return Err(TradeError::InvalidOffer {
                reason: format!("min_trade {} exceeds max_trade {}", self.min_trade, self.max_trade),
            });
        }
        if self.max_trade > self.available_amount {
            return Err(TradeError::InvalidOffer {
                reason: format!(
                    "max_trade {} exceeds available_amount {}",
                    self.max_trade, self.available_amount
                ),
            });
        }
        if self.available_amount > self.sell_amount {
            return Err(TradeError::InvalidOffer {
                reason: format!(
                    "available_amount {} exceeds sell_amount {}",
                    self.available_amount, self.sell_amount
                ),
            });
        }
        if self.buy_amount != derive_buy_amount(self.sell_amount, self.exchange_rate) {
            return Err(TradeError::InvalidOffer {
                reason: "buy_amount does not match sell_amount * exchange_rate".into(),
            });
        }
        Ok(())
    }
}

/// A new offer as composed by a maker, before the backend assigns identity.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferDraft {
    pub sell_currency: Currency,
    pub buy_currency: Currency,
    pub sell_amount: Amount,
    pub exchange_rate: Rate,
    pub margin_percent: Decimal,
    pub payment_method_ids: Vec<PaymentMethodId>,
    pub payment_window_minutes: u32,
    pub min_trade: Amount,
    pub max_trade: Amount,
    pub kyc_required: bool,
    pub terms: Option<String>,
    pub auto_reply_message: Option<String>,
}

impl OfferDraft {
    /// The buy amount the published offer will carry.
    #[must_use]
    pub fn buy_amount(&self) -> Amount {
        derive_buy_amount(self.sell_amount, self.exchange_rate)
    }

    /// Validate the draft before publication. No network call is made on
    /// failure.
    pub fn validate(&self) -> Result<(), TradeError> {
        let reject = |reason: String| Err(TradeError::InvalidOffer { reason });

        if self.sell_amount <= Amount::ZERO {
            return reject(format!("sell_amount {} must be positive", self.sell_amount));
        }
        if self.exchange_rate <= Rate::ZERO {
            return reject(format!("exchange_rate {} must be positive", self.exchange_rate));
        }
        if self.min_trade <= Amount::ZERO {
            return reject(format!("min_trade {} must be positive", self.min_trade));
        }
        if self.min_trade > self.max_trade {
            return reject(format!(
                "min_trade {} exceeds max_trade {}",
                self.min_trade, self.max_trade
            ));
        }
        // A fresh offer has availability == sell_amount.
        if self.max_trade > self.sell_amount {
            return reject(format!(
                "max_trade {} exceeds sell_amount {}",
                self.max_trade, self.sell_amount
            ));
        }
        if self.payment_method_ids.is_empty() {
            return reject("at least one payment method is required".into());
        }
        if self.payment_window_minutes == 0 {
            return reject("payment window must be at least one minute".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::domain::currency::CurrencyKind;
    use crate::domain::ids::UserId;
    use crate::domain::participant::OnlineStatus;
    use crate::domain::payment::{PaymentLimits, PaymentMethodKind};

    fn usd() -> Currency {
        Currency::new("USD", "US Dollar", "$", CurrencyKind::Fiat)
    }

    fn eur() -> Currency {
        Currency::new("EUR", "Euro", "€", CurrencyKind::Fiat)
    }

    fn maker() -> Participant {
        Participant {
            id: UserId::new("maker-1"),
            name: "Marta".into(),
            trust_score: 91,
            completed_trades: 40,
            response_time: "replies within minutes".into(),
            online_status: OnlineStatus::Online,
        }
    }

    fn bank() -> PaymentMethod {
        PaymentMethod {
            id: PaymentMethodId::new("pm-bank"),
            name: "Bank transfer".into(),
            kind: PaymentMethodKind::BankTransfer,
            processing_time: "1-2 business days".into(),
            limits: PaymentLimits {
                min: dec!(10),
                max: dec!(10000),
            },
        }
    }

    fn offer() -> Offer {
        Offer {
            id: OfferId::new("offer-1"),
            maker: maker(),
            sell_currency: usd(),
            buy_currency: eur(),
            sell_amount: dec!(5000),
            buy_amount: dec!(4600.00),
            exchange_rate: dec!(0.92),
            margin_percent: dec!(1.5),
            payment_methods: vec![bank()],
            payment_window_minutes: 60,
            min_trade: dec!(100),
            max_trade: dec!(5000),
            available_amount: dec!(3000),
            status: OfferStatus::Active,
            kyc_required: false,
            terms: None,
            auto_reply_message: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn amount_below_min_is_rejected() {
        let err = offer().validate_amount(dec!(99)).unwrap_err();
        assert!(matches!(err, TradeError::InvalidAmount { .. }));
    }

    #[test]
    fn amount_above_availability_is_rejected() {
        // max_trade is 5000 but only 3000 remains available.
        let err = offer().validate_amount(dec!(6000)).unwrap_err();
        assert_eq!(
            err,
            TradeError::InvalidAmount {
                amount: dec!(6000),
                min: dec!(100),
                max: dec!(3000),
            }
        );
        assert!(offer().validate_amount(dec!(3500)).is_err());
    }

    #[test]
    fn amount_within_bounds_is_accepted() {
        assert!(offer().validate_amount(dec!(2000)).is_ok());
        assert!(offer().validate_amount(dec!(100)).is_ok());
        assert!(offer().validate_amount(dec!(3000)).is_ok());
    }

    #[test]
    fn tradable_max_is_min_of_limit_and_availability() {
        assert_eq!(offer().tradable_max(), dec!(3000));
        let mut o = offer();
        o.available_amount = dec!(8000);
        o.sell_amount = dec!(8000);
        assert_eq!(o.tradable_max(), dec!(5000));
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        let err = offer()
            .payment_method(&PaymentMethodId::new("pm-card"))
            .unwrap_err();
        assert!(matches!(err, TradeError::PaymentMethodNotOffered { .. }));
    }

    #[test]
    fn invariant_violations_are_detected() {
        assert!(offer().check_invariants().is_ok());

        let mut o = offer();
        o.available_amount = dec!(6000);
        assert!(o.check_invariants().is_err());

        let mut o = offer();
        o.min_trade = dec!(9000);
        assert!(o.check_invariants().is_err());

        let mut o = offer();
        o.buy_amount = dec!(1);
        assert!(o.check_invariants().is_err());
    }

    fn draft() -> OfferDraft {
        OfferDraft {
            sell_currency: usd(),
            buy_currency: eur(),
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

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
        assert_eq!(draft().buy_amount(), dec!(4600.00));
    }

    #[test]
    fn draft_rejects_inverted_bounds() {
        let mut d = draft();
        d.min_trade = dec!(6000);
        d.max_trade = dec!(500);
        assert!(matches!(
            d.validate().unwrap_err(),
            TradeError::InvalidOffer { .. }
        ));
    }

    #[test]
    fn draft_requires_payment_methods_and_window() {
        let mut d = draft();
        d.payment_method_ids.clear();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.payment_window_minutes = 0;
        assert!(d.validate().is_err());
    }
}
