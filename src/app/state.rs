//! Session-held trade state.
//!
//! One session synchronizes at most one trade at a time. The active-trade
//! slot is a `tokio::sync::watch` pair: the sender side is owned here and
//! every mutation funnels through it, receivers are handed out as the
//! read-only observable. `send_if_modified` gives the two guarantees the
//! slot needs directly: compare-and-set semantics for racing writers, and
//! no watcher wake-up when a reconciliation changes nothing.

use tokio::sync::watch;

use crate::domain::{Trade, TradeId, TradeStatus};

/// Result of applying a reconciliation fetch to the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The fetched trade replaced the held one.
    Replaced {
        from: TradeStatus,
        to: TradeStatus,
    },
    /// Fetched status equals the held status; nothing was written.
    Unchanged,
    /// The slot moved on while the fetch was in flight (trade replaced,
    /// abandoned, or advanced by a concurrent transition); the fetch result
    /// was discarded.
    Superseded,
}

/// The exclusive active-trade slot of a session.
pub struct SessionState {
    tx: watch::Sender<Option<Trade>>,
}

impl SessionState {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Subscribe to the read-only current-trade observable.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Trade>> {
        self.tx.subscribe()
    }

    /// Clone of the currently held trade, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Trade> {
        self.tx.borrow().clone()
    }

    /// Id of the currently held trade, if any.
    #[must_use]
    pub fn active_id(&self) -> Option<TradeId> {
        self.tx.borrow().as_ref().map(|t| t.id.clone())
    }

    /// Adopt a trade as the session's active trade, displacing any prior one.
    pub fn adopt(&self, trade: Trade) {
        self.tx.send_replace(Some(trade));
    }

    /// Clear the slot, returning the trade that was held.
    pub fn clear(&self) -> Option<Trade> {
        self.tx.send_replace(None)
    }

    /// Apply the authoritative result of a mutating call.
    ///
    /// Replaces the held trade only when ids match; returns false (and
    /// discards `updated`) when the session has moved on. Unlike
    /// [`reconcile`](Self::reconcile) this does not compare statuses; the
    /// response to a transition the session itself requested is always
    /// fresher than what it held.
    pub fn apply_update(&self, updated: Trade) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|slot| match slot {
            Some(current) if current.id == updated.id => {
                let notify = *current != updated;
                *slot = Some(updated);
                applied = true;
                notify
            }
            _ => false,
        });
        applied
    }

    /// Apply a reconciliation fetch, last-write-wins by status recency.
    ///
    /// The fetch is applied only when the slot still holds the trade the
    /// fetch was started against (`expected_id`) in the status observed at
    /// that time (`expected_status`). A concurrent transition that advanced
    /// the status, or a session switch, supersedes the fetch. An equal
    /// status is a no-op that wakes no watcher.
    pub fn reconcile(
        &self,
        expected_id: &TradeId,
        expected_status: TradeStatus,
        fetched: Trade,
    ) -> Reconciliation {
        let mut outcome = Reconciliation::Superseded;
        self.tx.send_if_modified(|slot| match slot {
            Some(current)
                if current.id == *expected_id
                    && current.status == expected_status
                    && fetched.id == *expected_id =>
            {
                if fetched.status == current.status {
                    outcome = Reconciliation::Unchanged;
                    false
                } else {
                    outcome = Reconciliation::Replaced {
                        from: current.status,
                        to: fetched.status,
                    };
                    // Server is authoritative: wholesale replacement, no
                    // field-level merge.
                    *slot = Some(fetched);
                    true
                }
            }
            _ => false,
        });
        outcome
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
