//! Outbound ports: interfaces the engine requires from the outside world.

pub mod identity;
pub mod marketplace;
pub mod notifier;

pub use identity::IdentityProvider;
pub use marketplace::{
    MarketplaceApi, PaymentProofUpload, TradeRating, TradeRequest, TransitionCommand,
};
pub use notifier::{Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier};
