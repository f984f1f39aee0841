//! Fxpeer - peer-to-peer currency exchange trade lifecycle engine.
//!
//! This crate implements the client-side core of a P2P foreign-exchange
//! marketplace: offers are published by makers, accepted by takers, and the
//! resulting trade walks a multi-step settlement lifecycle (acceptance,
//! escrow settlement, payment proof, confirmation, release, optional dispute
//! and rating) against an authoritative REST backend.
//!
//! # Architecture
//!
//! - [`domain`] - Transport-agnostic model: currencies, offers, trades and
//!   the trade lifecycle state machine with its legal-transition table.
//! - [`port`] - Collaborator contracts: the marketplace transport, identity
//!   provider and notifier surfaces.
//! - [`adapter`] - Concrete bindings: the reqwest HTTP adapter (including
//!   wire-name normalization) and the inbound CLI.
//! - [`app`] - Orchestration: trade creation under validation and the
//!   one-active-trade-per-buyer rule, status transitions with actor checks,
//!   side-effect drivers, and the cancellable single-flight polling loop
//!   that reconciles local state against backend truth.
//! - [`config`] - TOML configuration with validation and logging setup.
//! - [`error`] - Error taxonomy for the crate.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fxpeer::adapter::outbound::{ConfigIdentity, HttpMarketplace};
//! use fxpeer::app::TradeOrchestrator;
//! use fxpeer::config::Config;
//! use fxpeer::domain::UserId;
//! use fxpeer::port::outbound::NotifierRegistry;
//!
//! let config = Config::default();
//! let orchestrator = TradeOrchestrator::new(
//!     Arc::new(HttpMarketplace::new(&config.api)),
//!     Arc::new(ConfigIdentity::new(UserId::new("u-1"))),
//!     NotifierRegistry::new(),
//!     config.sync,
//! );
//! let _updates = orchestrator.watch_trade();
//! ```

pub mod adapter;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
