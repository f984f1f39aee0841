//! Notifier port for engine events.
//!
//! The engine hands typed events to registered notifiers; it never formats
//! user-facing strings itself. Presentation belongs to the consumer.

use crate::domain::{TradeId, TradeStatus};

/// Events the orchestration engine emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A trade was adopted as the session's active trade.
    TradeAdopted { trade_id: TradeId, status: TradeStatus },
    /// The active trade's status changed (transition or reconciliation).
    TradeUpdated {
        trade_id: TradeId,
        from: TradeStatus,
        to: TradeStatus,
    },
    /// The session's active trade was cleared (rating submitted or abandoned).
    SessionEnded { trade_id: TradeId },
    /// Reconciliation has failed `consecutive_failures` times in a row.
    ///
    /// Emitted once per failure streak, when the configured threshold is
    /// crossed; individual transient failures stay silent.
    SyncStalled { trade_id: TradeId, consecutive_failures: u32 },
    /// Reconciliation succeeded again after a reported stall.
    SyncRecovered { trade_id: TradeId },
}

/// Trait for notification handlers.
///
/// Implementations must be thread-safe and return quickly; spawn a task for
/// anything slow.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::TradeAdopted { trade_id, status } => {
                info!(trade_id = %trade_id, status = %status, "Trade adopted");
            }
            Event::TradeUpdated { trade_id, from, to } => {
                info!(trade_id = %trade_id, from = %from, to = %to, "Trade updated");
            }
            Event::SessionEnded { trade_id } => {
                info!(trade_id = %trade_id, "Trade session ended");
            }
            Event::SyncStalled {
                trade_id,
                consecutive_failures,
            } => {
                warn!(
                    trade_id = %trade_id,
                    failures = consecutive_failures,
                    "Trade synchronization stalled"
                );
            }
            Event::SyncRecovered { trade_id } => {
                info!(trade_id = %trade_id, "Trade synchronization recovered");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording(Arc<Mutex<Vec<Event>>>);

    impl Notifier for Recording {
        fn notify(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn registry_broadcasts_to_all() {
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));

        let mut registry = NotifierRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(Recording(seen_a.clone())));
        registry.register(Box::new(Recording(seen_b.clone())));
        assert_eq!(registry.len(), 2);

        registry.notify_all(Event::SessionEnded {
            trade_id: TradeId::new("t1"),
        });

        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert_eq!(seen_b.lock().unwrap().len(), 1);
    }
}
