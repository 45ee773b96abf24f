//! # Change Events
//!
//! Explicit publish/subscribe replacement for "re-render on every state
//! change". The console publishes a [`ChangeEvent`] after every completed
//! mutation. Subscribers run synchronously, in registration order, and
//! always observe state strictly after the mutation that produced the
//! event.

use std::fmt;

use credreg_core::CertificateId;

use crate::revocation::RevocationState;

/// A state change observable by console subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The store was replaced by a fresh registry listing.
    Loaded {
        /// Number of records now held.
        count: usize,
    },
    /// The registry listing could not be loaded; the store is empty.
    LoadFailed {
        /// Reason surfaced to the user.
        reason: String,
    },
    /// A record moved from active to revoked.
    Revoked {
        /// The revoked certificate.
        id: CertificateId,
    },
    /// One or more filter fields changed.
    FilterChanged,
    /// The search history changed.
    HistoryChanged,
    /// The filtered view was recomputed.
    ViewRecomputed {
        /// Records in the view.
        visible: usize,
        /// Records in the store.
        total: usize,
    },
    /// The revocation workflow moved to a new state.
    RevocationStateChanged {
        /// The state entered.
        state: RevocationState,
    },
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Ordered list of change subscribers.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It is called after all earlier subscribers.
    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber.
    pub fn publish(&self, event: &ChangeEvent) {
        for (_, subscriber) in &self.subscribers {
            subscriber(event);
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn publish_reaches_subscribers_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        let a = Arc::clone(&seen);
        bus.subscribe(move |_| a.lock().push("first"));
        let b = Arc::clone(&seen);
        bus.subscribe(move |_| b.lock().push("second"));

        bus.publish(&ChangeEvent::FilterChanged);
        assert_eq!(*seen.lock(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let c = Arc::clone(&count);
        let id = bus.subscribe(move |_| *c.lock() += 1);

        bus.publish(&ChangeEvent::HistoryChanged);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&ChangeEvent::HistoryChanged);

        assert_eq!(*count.lock(), 1);
        assert!(bus.is_empty());
    }
}
