//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`api`] - [`ScriptedMarketplace`](api::ScriptedMarketplace), a queued
//!   mock of the marketplace port with call counters and injectable latency.
//! - [`domain`] - Builders for offers, trades, participants and proofs.
//! - [`identity`] - [`StaticIdentity`](identity::StaticIdentity).
//! - [`notify`] - [`RecordingNotifier`](notify::RecordingNotifier).

pub mod api;
pub mod domain;
pub mod identity;
pub mod notify;
