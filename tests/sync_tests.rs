//! Synchronization loop properties: single-flight, idempotent reconciliation,
//! failure escalation, deterministic cancellation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fxpeer::app::{ReconcileOutcome, Reconciler, SessionState, SyncLoop};
use fxpeer::domain::{TradeId, TradeStatus};
use fxpeer::port::outbound::{Event, NotifierRegistry};
use fxpeer::testkit::api::{transport_failure, ScriptedMarketplace};
use fxpeer::testkit::domain::trade_with_status;
use fxpeer::testkit::notify::RecordingNotifier;

struct SyncHarness {
    api: Arc<ScriptedMarketplace>,
    state: Arc<SessionState>,
    reconciler: Arc<Reconciler>,
    events: Arc<Mutex<Vec<Event>>>,
}

fn sync_harness(failure_threshold: u32) -> SyncHarness {
    let api = Arc::new(ScriptedMarketplace::new());
    let state = Arc::new(SessionState::new());
    let recorder = RecordingNotifier::new();
    let events = recorder.events();
    let mut notifiers = NotifierRegistry::new();
    notifiers.register(Box::new(recorder));
    let reconciler = Arc::new(Reconciler::new(
        api.clone(),
        state.clone(),
        Arc::new(notifiers),
        failure_threshold,
    ));
    SyncHarness {
        api,
        state,
        reconciler,
        events,
    }
}

#[tokio::test]
async fn reconciling_an_unchanged_trade_is_a_silent_noop() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::Accepted));

    let before = h.state.snapshot().unwrap();
    let mut watcher = h.state.subscribe();
    watcher.mark_unchanged();

    for _ in 0..5 {
        assert_eq!(h.reconciler.run_once().await, ReconcileOutcome::Unchanged);
    }

    assert!(!watcher.has_changed().unwrap());
    assert_eq!(h.state.snapshot().unwrap(), before);
    assert_eq!(h.api.calls().fetches(), 5);
    assert!(h.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reconciliation_adopts_backend_truth_wholesale() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    h.api
        .queue_fetch(Ok(trade_with_status("t-1", TradeStatus::PaymentPending)));

    let outcome = h.reconciler.run_once().await;
    assert_eq!(
        outcome,
        ReconcileOutcome::Applied {
            from: TradeStatus::Accepted,
            to: TradeStatus::PaymentPending,
        }
    );
    assert_eq!(
        h.state.snapshot().unwrap().status,
        TradeStatus::PaymentPending
    );
    assert!(h.events.lock().unwrap().iter().any(|e| matches!(
        e,
        Event::TradeUpdated {
            from: TradeStatus::Accepted,
            to: TradeStatus::PaymentPending,
            ..
        }
    )));
}

#[tokio::test]
async fn fetch_failures_leave_state_untouched_and_escalate_once() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    let before = h.state.snapshot().unwrap();

    for _ in 0..4 {
        h.api.queue_fetch(Err(transport_failure()));
    }

    assert_eq!(
        h.reconciler.run_once().await,
        ReconcileOutcome::Failed { consecutive: 1 }
    );
    assert_eq!(
        h.reconciler.run_once().await,
        ReconcileOutcome::Failed { consecutive: 2 }
    );
    assert!(h.events.lock().unwrap().is_empty(), "below threshold stays silent");

    assert_eq!(
        h.reconciler.run_once().await,
        ReconcileOutcome::Failed { consecutive: 3 }
    );
    assert_eq!(
        h.reconciler.run_once().await,
        ReconcileOutcome::Failed { consecutive: 4 }
    );

    let stalls = h
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, Event::SyncStalled { .. }))
        .count();
    assert_eq!(stalls, 1, "a failure streak escalates exactly once");
    assert_eq!(h.state.snapshot().unwrap(), before);

    // Recovery resets the streak and reports it.
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::Accepted));
    assert_eq!(h.reconciler.run_once().await, ReconcileOutcome::Unchanged);
    assert!(h
        .events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, Event::SyncRecovered { .. })));

    // A fresh streak must climb to the threshold again before escalating.
    h.api.queue_fetch(Err(transport_failure()));
    assert_eq!(
        h.reconciler.run_once().await,
        ReconcileOutcome::Failed { consecutive: 1 }
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_reconcile_attempts_are_single_flight() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::Accepted));
    h.api.set_fetch_delay(Duration::from_secs(2));

    let (a, b) = tokio::join!(h.reconciler.run_once(), h.reconciler.run_once());

    let outcomes = [a, b];
    assert!(outcomes.contains(&ReconcileOutcome::Unchanged));
    assert!(outcomes.contains(&ReconcileOutcome::SkippedInFlight));
    assert_eq!(h.api.calls().fetches(), 1, "the overlapping attempt issued no fetch");
}

#[tokio::test(start_paused = true)]
async fn slow_fetches_never_overlap_in_the_loop() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::Accepted));
    // Each fetch outlasts a poll interval.
    h.api.set_fetch_delay(Duration::from_secs(2));

    let handle = SyncLoop::spawn(
        h.reconciler.clone(),
        Duration::from_secs(1),
        TradeId::new("t-1"),
    );

    tokio::time::sleep(Duration::from_secs(5)).await;
    let fetches = h.api.calls().fetches();
    // Serial schedule: at most one fetch per 2s window, never the five a
    // 1s cadence would issue if ticks queued behind the slow fetch.
    assert!(
        (1..=3).contains(&fetches),
        "expected serial fetches, got {fetches}"
    );
    assert!(!handle.is_finished());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn loop_stops_once_the_trade_is_terminal() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::PaymentConfirmed));
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::Completed));

    let handle = SyncLoop::spawn(
        h.reconciler.clone(),
        Duration::from_secs(1),
        TradeId::new("t-1"),
    );

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(h.state.snapshot().unwrap().status, TradeStatus::Completed);
    assert!(handle.is_finished());
    let fetches = h.api.calls().fetches();

    // No further fetch once terminal.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.api.calls().fetches(), fetches);
}

#[tokio::test(start_paused = true)]
async fn cancellation_discards_the_in_flight_fetch() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::PaymentPending));
    h.api.set_fetch_delay(Duration::from_secs(3));

    let handle = SyncLoop::spawn(
        h.reconciler.clone(),
        Duration::from_secs(1),
        TradeId::new("t-1"),
    );

    // Let the first tick start its fetch, then cancel mid-flight.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(h.api.calls().fetches(), 1);
    handle.stop().await;

    // The fetch result would have advanced the status; it must be discarded.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.state.snapshot().unwrap().status, TradeStatus::Accepted);
    assert_eq!(h.api.calls().fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn loop_exits_when_the_session_is_cleared() {
    let h = sync_harness(3);
    h.state
        .adopt(trade_with_status("t-1", TradeStatus::Accepted));
    h.api
        .set_default_trade(trade_with_status("t-1", TradeStatus::Accepted));

    let handle = SyncLoop::spawn(
        h.reconciler.clone(),
        Duration::from_secs(1),
        TradeId::new("t-1"),
    );

    h.state.clear();
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(handle.is_finished());
}

#[tokio::test]
async fn reconciler_is_idle_without_an_active_trade() {
    let h = sync_harness(3);
    assert_eq!(h.reconciler.run_once().await, ReconcileOutcome::Idle);
    assert_eq!(h.api.calls().fetches(), 0);
}
