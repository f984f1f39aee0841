//! Session role resolution.
//!
//! Determines, from the authenticated identity and a trade's participant
//! records, whether the caller acts as maker or taker. Which transitions a
//! caller may *initiate* is gated on this role; which transitions are legal
//! for the trade overall is the state machine's concern.

use std::sync::Arc;

use crate::domain::{Offer, Trade, TradeError, TradeRole, UserId};
use crate::port::outbound::IdentityProvider;

/// Resolves the authenticated user's role in trades and offers.
pub struct RoleResolver {
    identity: Arc<dyn IdentityProvider>,
}

impl RoleResolver {
    /// Create a resolver over an identity provider.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// The authenticated user.
    #[must_use]
    pub fn current_user(&self) -> UserId {
        self.identity.current_user()
    }

    /// The caller's role in `trade`, or [`TradeError::NotParticipant`].
    pub fn role_in(&self, trade: &Trade) -> Result<TradeRole, TradeError> {
        let user = self.current_user();
        trade
            .role_of(&user)
            .ok_or_else(|| TradeError::NotParticipant {
                trade_id: trade.id.clone(),
                user_id: user,
            })
    }

    /// Whether the caller published `offer`.
    #[must_use]
    pub fn is_maker_of(&self, offer: &Offer) -> bool {
        offer.maker.id == self.current_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{offer, trade};
    use crate::testkit::identity::StaticIdentity;

    fn resolver(user: &str) -> RoleResolver {
        RoleResolver::new(Arc::new(StaticIdentity::new(user)))
    }

    #[test]
    fn maker_and_taker_roles() {
        // testkit trades are maker-1 vs taker-1.
        let t = trade("t-1");
        assert_eq!(resolver("maker-1").role_in(&t).unwrap(), TradeRole::Maker);
        assert_eq!(resolver("taker-1").role_in(&t).unwrap(), TradeRole::Taker);
    }

    #[test]
    fn outsider_is_not_a_participant() {
        let t = trade("t-1");
        let err = resolver("stranger").role_in(&t).unwrap_err();
        assert!(matches!(err, TradeError::NotParticipant { .. }));
    }

    #[test]
    fn offer_maker_detection() {
        let o = offer("o-1");
        assert!(resolver("maker-1").is_maker_of(&o));
        assert!(!resolver("taker-1").is_maker_of(&o));
    }
}
