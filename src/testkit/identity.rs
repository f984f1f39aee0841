//! Fixed-identity provider for tests.

use crate::domain::UserId;
use crate::port::outbound::IdentityProvider;

/// An identity provider that always answers with the same user.
pub struct StaticIdentity {
    user: UserId,
}

impl StaticIdentity {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: UserId::new(user),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> UserId {
        self.user.clone()
    }
}
