//! Outbound adapters: concrete implementations of the outbound ports.

pub mod http;
pub mod identity;

pub use http::HttpMarketplace;
pub use identity::ConfigIdentity;
