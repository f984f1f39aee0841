//! Trade synchronization: single-flight reconciliation and the polling loop.
//!
//! [`Reconciler`] performs one guarded fetch-and-apply against the session
//! state; [`SyncLoop`] drives it on a timer until the trade stops moving or
//! the loop is cancelled. The in-flight guard is owned by the reconciler and
//! shared between the periodic tick and the one-off confirmatory fetches the
//! orchestrator schedules after a transition, so the two paths can never
//! issue overlapping fetches for the same session.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::state::{Reconciliation, SessionState};
use crate::domain::{TradeId, TradeStatus};
use crate::port::outbound::{Event, MarketplaceApi, NotifierRegistry};

/// Result of one reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Fetched state replaced the held trade.
    Applied {
        from: TradeStatus,
        to: TradeStatus,
    },
    /// Backend and session agree; nothing written.
    Unchanged,
    /// Another fetch was already in flight; this attempt was skipped.
    SkippedInFlight,
    /// The session moved on while the fetch was in flight; result discarded.
    Superseded,
    /// No active trade to reconcile.
    Idle,
    /// The held trade is terminal; nothing to poll.
    Terminal,
    /// The fetch failed; local state untouched.
    Failed { consecutive: u32 },
}

/// Resets the in-flight flag even when the owning future is dropped
/// mid-fetch (loop cancellation).
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Fetches authoritative trade state and reconciles it into the session.
pub struct Reconciler {
    api: Arc<dyn MarketplaceApi>,
    state: Arc<SessionState>,
    notifiers: Arc<NotifierRegistry>,
    failure_threshold: u32,
    in_flight: AtomicBool,
    consecutive_failures: AtomicU32,
    stall_reported: AtomicBool,
}

impl Reconciler {
    /// Create a reconciler over the shared session state.
    #[must_use]
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        state: Arc<SessionState>,
        notifiers: Arc<NotifierRegistry>,
        failure_threshold: u32,
    ) -> Self {
        Self {
            api,
            state,
            notifiers,
            failure_threshold: failure_threshold.max(1),
            in_flight: AtomicBool::new(false),
            consecutive_failures: AtomicU32::new(0),
            stall_reported: AtomicBool::new(false),
        }
    }

    /// Run one reconciliation attempt.
    ///
    /// At most one fetch is ever outstanding; an attempt that finds one in
    /// flight returns [`ReconcileOutcome::SkippedInFlight`] without queueing.
    /// A failed fetch leaves the session untouched and only escalates (once
    /// per streak) after `failure_threshold` consecutive failures.
    pub async fn run_once(&self) -> ReconcileOutcome {
        let Some(held) = self.state.snapshot() else {
            return ReconcileOutcome::Idle;
        };
        if held.status.is_terminal() {
            return ReconcileOutcome::Terminal;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return ReconcileOutcome::SkippedInFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let expected_id = held.id.clone();
        let expected_status = held.status;

        match self.api.fetch_trade(&expected_id).await {
            Ok(fetched) => {
                self.consecutive_failures.store(0, Ordering::SeqCst);
                if self.stall_reported.swap(false, Ordering::SeqCst) {
                    self.notifiers.notify_all(Event::SyncRecovered {
                        trade_id: expected_id.clone(),
                    });
                }

                match self.state.reconcile(&expected_id, expected_status, fetched) {
                    Reconciliation::Replaced { from, to } => {
                        debug!(trade_id = %expected_id, %from, %to, "Reconciled trade state");
                        self.notifiers.notify_all(Event::TradeUpdated {
                            trade_id: expected_id,
                            from,
                            to,
                        });
                        ReconcileOutcome::Applied { from, to }
                    }
                    Reconciliation::Unchanged => ReconcileOutcome::Unchanged,
                    Reconciliation::Superseded => ReconcileOutcome::Superseded,
                }
            }
            Err(error) => {
                let consecutive = self.consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(
                    trade_id = %expected_id,
                    error = %error,
                    consecutive,
                    "Reconciliation fetch failed"
                );
                if consecutive >= self.failure_threshold
                    && !self.stall_reported.swap(true, Ordering::SeqCst)
                {
                    self.notifiers.notify_all(Event::SyncStalled {
                        trade_id: expected_id,
                        consecutive_failures: consecutive,
                    });
                }
                ReconcileOutcome::Failed { consecutive }
            }
        }
    }
}

/// Handle to a running synchronization loop.
///
/// Cancellation is deterministic: after [`cancel`](Self::cancel) (or drop)
/// no further tick fires, and a fetch that was in flight at cancellation
/// time is discarded rather than applied.
pub struct SyncHandle {
    trade_id: TradeId,
    cancel: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// The trade this loop synchronizes.
    #[must_use]
    pub fn trade_id(&self) -> &TradeId {
        &self.trade_id
    }

    /// Signal the loop to stop. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Whether the loop task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel and wait for the loop task to exit.
    pub async fn stop(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        // Dropping the handle must not leak a timer; the task observes the
        // closed channel and exits at its next await point.
        let _ = self.cancel.send(true);
    }
}

/// The periodic polling loop for the session's active trade.
pub struct SyncLoop;

impl SyncLoop {
    /// Spawn a polling loop for `trade_id`.
    ///
    /// The loop stops on its own when the trade reaches a terminal status or
    /// leaves the session, and immediately when cancelled through the
    /// returned handle.
    pub fn spawn(
        reconciler: Arc<Reconciler>,
        poll_interval: Duration,
        trade_id: TradeId,
    ) -> SyncHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let loop_trade = trade_id.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The state adopted just before spawning is already fresh;
            // consume the interval's immediate first tick.
            ticker.tick().await;

            debug!(trade_id = %loop_trade, "Sync loop started");
            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => {
                        let outcome = tokio::select! {
                            // Cancellation during a fetch drops the
                            // reconcile future; the in-flight guard resets
                            // and the response is never applied.
                            _ = cancel_rx.changed() => break,
                            outcome = reconciler.run_once() => outcome,
                        };
                        match outcome {
                            ReconcileOutcome::Applied { to, .. } if to.is_terminal() => break,
                            ReconcileOutcome::Terminal | ReconcileOutcome::Idle => break,
                            _ => {}
                        }
                    }
                }
            }
            debug!(trade_id = %loop_trade, "Sync loop stopped");
        });

        SyncHandle {
            trade_id,
            cancel: cancel_tx,
            task: Some(task),
        }
    }
}
