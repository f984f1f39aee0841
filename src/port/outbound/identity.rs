//! Identity provider port.
//!
//! Authentication and session storage are external concerns; the engine only
//! needs to know who the authenticated user is in order to resolve trade
//! roles and enforce actor rules.

use crate::domain::UserId;

/// Supplies the currently authenticated user.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated user's id.
    fn current_user(&self) -> UserId;
}
