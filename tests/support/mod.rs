//! Shared harness for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use fxpeer::app::TradeOrchestrator;
use fxpeer::config::SyncConfig;
use fxpeer::port::outbound::{Event, NotifierRegistry};
use fxpeer::testkit::api::ScriptedMarketplace;
use fxpeer::testkit::identity::StaticIdentity;
use fxpeer::testkit::notify::RecordingNotifier;

/// A sync config with a short poll cadence for tests.
pub fn fast_sync() -> SyncConfig {
    SyncConfig {
        poll_interval_ms: 1_000,
        failure_threshold: 3,
    }
}

/// An orchestrator over a scripted backend with a recording notifier.
pub struct Harness {
    pub api: Arc<ScriptedMarketplace>,
    pub orchestrator: TradeOrchestrator,
    pub events: Arc<Mutex<Vec<Event>>>,
}

impl Harness {
    /// Events captured so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

/// Build a harness acting as `user`.
pub fn harness(user: &str) -> Harness {
    harness_with_sync(user, fast_sync())
}

/// Build a harness acting as `user` with explicit sync tuning.
pub fn harness_with_sync(user: &str, sync: SyncConfig) -> Harness {
    let api = Arc::new(ScriptedMarketplace::new());
    let recorder = RecordingNotifier::new();
    let events = recorder.events();
    let mut notifiers = NotifierRegistry::new();
    notifiers.register(Box::new(recorder));

    let orchestrator = TradeOrchestrator::new(
        api.clone(),
        Arc::new(StaticIdentity::new(user)),
        notifiers,
        sync,
    );

    Harness {
        api,
        orchestrator,
        events,
    }
}
