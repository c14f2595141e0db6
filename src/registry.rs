//! Subscription records and the ordered registry that owns them.
//!
//! The registry keeps one sequence per subscription kind, mirroring the two
//! dispatch paths: [`publish`](crate::Broker::publish) only ever scans signal
//! subscriptions, [`publish_with`](crate::Broker::publish_with) only payload
//! subscriptions. Insertion order within a kind is dispatch order.
//!
//! The registry itself is not thread-safe; the [`Broker`](crate::Broker)
//! guards it with a single mutex and reads snapshots out of it for dispatch.

use std::sync::Arc;

use crate::payload::Payload;

/// Opaque identity for the owner of one or more subscriptions.
///
/// Issued by [`Broker::subscriber_id`](crate::Broker::subscriber_id). The
/// broker only ever compares identities; it attaches no other meaning to
/// them. A subscriber holds on to its id and passes it back to
/// [`unsubscribe`](crate::Broker::unsubscribe) before it goes away.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Zero-argument callable bound to a signal subscription.
pub(crate) type SignalFn = Arc<dyn Fn() + Send + Sync>;

/// Erased callable bound to a payload subscription.
///
/// Returns `true` if the payload matched the declared type and the callback
/// ran, `false` on a type mismatch.
pub(crate) type PayloadFn = Arc<dyn Fn(&Payload) -> bool + Send + Sync>;

/// The two subscription kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Signal,
    Payload,
}

/// An immutable record binding a subscriber identity, an event name, and a
/// callable. Created by the broker's subscribe methods, owned by the
/// [`Registry`] until removed.
pub(crate) struct Subscription {
    subscriber: SubscriberId,
    event: String,
    callable: Callable,
}

pub(crate) enum Callable {
    Signal(SignalFn),
    Payload(PayloadFn),
}

impl Subscription {
    pub(crate) fn signal(subscriber: SubscriberId, event: &str, callable: SignalFn) -> Self {
        Self {
            subscriber,
            event: event.to_string(),
            callable: Callable::Signal(callable),
        }
    }

    pub(crate) fn payload(subscriber: SubscriberId, event: &str, callable: PayloadFn) -> Self {
        Self {
            subscriber,
            event: event.to_string(),
            callable: Callable::Payload(callable),
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        match self.callable {
            Callable::Signal(_) => Kind::Signal,
            Callable::Payload(_) => Kind::Payload,
        }
    }
}

/// Ordered storage for live subscriptions, partitioned by kind.
///
/// A subscription lives in exactly one sequence, exactly once. Duplicate
/// (subscriber, event) pairs are allowed and each receives its own dispatch.
#[derive(Default)]
pub(crate) struct Registry {
    signal: Vec<Subscription>,
    payload: Vec<Subscription>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends the subscription to the sequence for its kind.
    pub(crate) fn insert(&mut self, subscription: Subscription) {
        match subscription.kind() {
            Kind::Signal => self.signal.push(subscription),
            Kind::Payload => self.payload.push(subscription),
        }
    }

    /// Removes every subscription owned by `id`, of either kind, preserving
    /// the order of the rest. Removing an unknown id is a no-op.
    pub(crate) fn remove_subscriber(&mut self, id: SubscriberId) {
        self.signal.retain(|s| s.subscriber != id);
        self.payload.retain(|s| s.subscriber != id);
    }

    /// Returns `true` if at least one live subscription carries `id`.
    pub(crate) fn contains_subscriber(&self, id: SubscriberId) -> bool {
        self.signal.iter().chain(self.payload.iter()).any(|s| s.subscriber == id)
    }

    /// Snapshot of the signal callables registered under `event`, in
    /// insertion order.
    pub(crate) fn matching_signal(&self, event: &str) -> Vec<SignalFn> {
        self.signal
            .iter()
            .filter(|s| s.event == event)
            .filter_map(|s| match &s.callable {
                Callable::Signal(f) => Some(Arc::clone(f)),
                Callable::Payload(_) => None,
            })
            .collect()
    }

    /// Snapshot of the payload callables registered under `event`, in
    /// insertion order.
    pub(crate) fn matching_payload(&self, event: &str) -> Vec<PayloadFn> {
        self.payload
            .iter()
            .filter(|s| s.event == event)
            .filter_map(|s| match &s.callable {
                Callable::Payload(f) => Some(Arc::clone(f)),
                Callable::Signal(_) => None,
            })
            .collect()
    }

    /// Every live subscription's event name, signal subscriptions first.
    /// Used to build the teardown diagnostic.
    pub(crate) fn event_names(&self) -> Vec<String> {
        self.signal
            .iter()
            .chain(self.payload.iter())
            .map(|s| s.event.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.signal.len() + self.payload.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.signal.is_empty() && self.payload.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.signal.clear();
        self.payload.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_signal(id: SubscriberId, event: &str) -> Subscription {
        Subscription::signal(id, event, Arc::new(|| {}))
    }

    fn noop_payload(id: SubscriberId, event: &str) -> Subscription {
        Subscription::payload(id, event, Arc::new(|_: &Payload| true))
    }

    // ==================== Insert / Contains ====================

    #[test]
    fn new_registry_is_empty() {
        let registry = Registry::new();

        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn insert_partitions_by_kind() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);

        registry.insert(noop_signal(id, "A"));
        registry.insert(noop_payload(id, "A"));

        assert_eq!(registry.matching_signal("A").len(), 1);
        assert_eq!(registry.matching_payload("A").len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn contains_subscriber_sees_both_kinds() {
        let mut registry = Registry::new();
        let signal_owner = SubscriberId::new(1);
        let payload_owner = SubscriberId::new(2);

        registry.insert(noop_signal(signal_owner, "A"));
        registry.insert(noop_payload(payload_owner, "B"));

        assert!(registry.contains_subscriber(signal_owner));
        assert!(registry.contains_subscriber(payload_owner));
        assert!(!registry.contains_subscriber(SubscriberId::new(3)));
    }

    #[test]
    fn duplicate_subscriptions_are_kept() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);

        registry.insert(noop_signal(id, "A"));
        registry.insert(noop_signal(id, "A"));

        assert_eq!(registry.matching_signal("A").len(), 2);
    }

    // ==================== Matching ====================

    #[test]
    fn matching_filters_by_event_name() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);

        registry.insert(noop_signal(id, "A"));
        registry.insert(noop_signal(id, "B"));

        assert_eq!(registry.matching_signal("A").len(), 1);
        assert_eq!(registry.matching_signal("B").len(), 1);
        assert!(registry.matching_signal("C").is_empty());
    }

    #[test]
    fn matching_signal_ignores_payload_subscriptions() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);

        registry.insert(noop_payload(id, "A"));

        assert!(registry.matching_signal("A").is_empty());
        assert_eq!(registry.matching_payload("A").len(), 1);
    }

    // ==================== Removal ====================

    #[test]
    fn remove_subscriber_drops_both_kinds_across_names() {
        let mut registry = Registry::new();
        let gone = SubscriberId::new(1);
        let kept = SubscriberId::new(2);

        registry.insert(noop_signal(gone, "A"));
        registry.insert(noop_payload(gone, "B"));
        registry.insert(noop_signal(kept, "A"));

        registry.remove_subscriber(gone);

        assert!(!registry.contains_subscriber(gone));
        assert!(registry.contains_subscriber(kept));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_unknown_subscriber_is_a_noop() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);
        registry.insert(noop_signal(id, "A"));

        registry.remove_subscriber(SubscriberId::new(99));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_preserves_order_of_remaining() {
        let mut registry = Registry::new();
        let first = SubscriberId::new(1);
        let second = SubscriberId::new(2);
        let third = SubscriberId::new(3);

        registry.insert(noop_signal(first, "A"));
        registry.insert(noop_signal(second, "A"));
        registry.insert(noop_signal(third, "A"));

        registry.remove_subscriber(second);

        // Two left, still in insertion order (first then third).
        let remaining: Vec<_> = registry.signal.iter().map(|s| s.subscriber).collect();
        assert_eq!(remaining, vec![first, third]);
    }

    // ==================== Diagnostics ====================

    #[test]
    fn event_names_lists_every_live_subscription() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);

        registry.insert(noop_signal(id, "A"));
        registry.insert(noop_signal(id, "A"));
        registry.insert(noop_payload(id, "B"));

        assert_eq!(registry.event_names(), vec!["A", "A", "B"]);
    }

    #[test]
    fn clear_empties_both_sequences() {
        let mut registry = Registry::new();
        let id = SubscriberId::new(1);
        registry.insert(noop_signal(id, "A"));
        registry.insert(noop_payload(id, "B"));

        registry.clear();

        assert!(registry.is_empty());
    }
}
