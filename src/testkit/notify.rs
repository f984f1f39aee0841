//! Recording notifier for asserting on emitted events.

use std::sync::{Arc, Mutex};

use crate::port::outbound::{Event, Notifier};

/// Captures every event it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the captured events; keep one before registering
    /// the notifier (registration consumes the notifier by box).
    pub fn events(&self) -> Arc<Mutex<Vec<Event>>> {
        self.events.clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}
