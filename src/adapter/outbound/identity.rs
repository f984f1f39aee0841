//! Identity adapter backed by static configuration.
//!
//! Real deployments plug the host application's session layer into the
//! [`IdentityProvider`] port; the CLI reads the user id from config.

use crate::domain::UserId;
use crate::port::outbound::IdentityProvider;

/// An identity provider with a fixed user id.
pub struct ConfigIdentity {
    user: UserId,
}

impl ConfigIdentity {
    /// Create an identity provider for the given user.
    #[must_use]
    pub fn new(user: UserId) -> Self {
        Self { user }
    }
}

impl IdentityProvider for ConfigIdentity {
    fn current_user(&self) -> UserId {
        self.user.clone()
    }
}
