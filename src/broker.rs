//! The notification broker: registration, name-matched dispatch, teardown.
//!
//! # Overview
//!
//! [`Broker`] owns the subscription registry and is the whole public surface
//! of the crate:
//!
//! - **Registration**: [`subscribe_signal`](Broker::subscribe_signal),
//!   [`subscribe_value`](Broker::subscribe_value),
//!   [`subscribe_ref`](Broker::subscribe_ref)
//! - **Removal**: [`unsubscribe`](Broker::unsubscribe) drops every
//!   subscription an identity owns
//! - **Dispatch**: [`publish`](Broker::publish) and
//!   [`publish_with`](Broker::publish_with) return how many subscriptions
//!   were invoked
//! - **Teardown**: [`drain`](Broker::drain) checks that every subscriber
//!   cleaned up after itself
//!
//! # Snapshot Dispatch
//!
//! The registry sits behind a single mutex, but callbacks are never invoked
//! while it is held. A publish call takes the lock just long enough to copy
//! the matching callables out, then dispatches against that snapshot:
//!
//! - a callback may re-enter the broker (subscribe, unsubscribe, publish)
//!   without deadlocking;
//! - a subscription added during a dispatch pass is not seen by that pass;
//! - a subscription removed during a pass may still fire if it was already
//!   in the snapshot. Once `unsubscribe` has returned, no later snapshot
//!   contains it.
//!
//! Within one publish call, subscriptions fire in registration order.
//!
//! # Example
//!
//! ```rust,ignore
//! let broker = Broker::new();
//! let id = broker.subscriber_id();
//!
//! broker.subscribe_signal(id, "Ready", || println!("ready"));
//! broker.subscribe_value(id, "Score", |points: u32| println!("{points}"));
//!
//! assert_eq!(broker.publish("Ready"), 1);
//! assert_eq!(broker.publish_with("Score", Payload::new(10u32)), 1);
//!
//! broker.unsubscribe(id);
//! broker.drain().unwrap();
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::error::{DanglingSubscriptions, TypeMismatch};
use crate::payload::Payload;
use crate::registry::{PayloadFn, Registry, SignalFn, SubscriberId, Subscription};
use crate::report::{LogReporter, Reporter};

/// Shared handle to one notification broker.
///
/// Cloning is cheap and every clone refers to the same registry, so a broker
/// can be handed to producers and subscribers on any thread. All operations
/// take `&self`.
#[derive(Clone)]
pub struct Broker {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    reporter: Box<dyn Reporter>,
}

impl Broker {
    /// Creates an empty broker reporting through [`LogReporter`].
    pub fn new() -> Self {
        Self::with_reporter(LogReporter)
    }

    /// Creates an empty broker with a custom report sink.
    pub fn with_reporter<R: Reporter + 'static>(reporter: R) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::new()),
                next_id: AtomicU64::new(0),
                reporter: Box::new(reporter),
            }),
        }
    }

    /// Issues a fresh subscriber identity.
    ///
    /// A subscriber typically obtains one id and uses it for all of its
    /// subscriptions, so a single [`unsubscribe`](Self::unsubscribe) call
    /// removes everything it registered.
    pub fn subscriber_id(&self) -> SubscriberId {
        SubscriberId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a signal subscription: `callback` fires, with no payload,
    /// every time `event` is published via [`publish`](Self::publish).
    ///
    /// Duplicate registrations are allowed and each fires independently.
    pub fn subscribe_signal<F>(&self, id: SubscriberId, event: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callable: SignalFn = Arc::new(callback);
        self.registry().insert(Subscription::signal(id, event, callable));
    }

    /// Registers a payload subscription in the owned-value shape: the
    /// callback receives a clone of the published `T` per delivery.
    ///
    /// The accepted type is fixed here; publishing a payload of any other
    /// type to `event` skips this subscription with a type mismatch report.
    pub fn subscribe_value<T, F>(&self, id: SubscriberId, event: &str, callback: F)
    where
        T: Any + Send + Sync + Clone,
        F: Fn(T) + Send + Sync + 'static,
    {
        let callable: PayloadFn = Arc::new(move |payload: &Payload| {
            match payload.downcast_ref::<T>() {
                Some(value) => {
                    callback(value.clone());
                    true
                }
                None => false,
            }
        });
        self.registry().insert(Subscription::payload(id, event, callable));
    }

    /// Registers a payload subscription in the borrowed-reference shape: the
    /// callback borrows the published `T` for the duration of the call.
    ///
    /// Use this when `T` is expensive or impossible to clone.
    pub fn subscribe_ref<T, F>(&self, id: SubscriberId, event: &str, callback: F)
    where
        T: Any + Send + Sync,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callable: PayloadFn = Arc::new(move |payload: &Payload| {
            match payload.downcast_ref::<T>() {
                Some(value) => {
                    callback(value);
                    true
                }
                None => false,
            }
        });
        self.registry().insert(Subscription::payload(id, event, callable));
    }

    /// Removes every subscription owned by `id`, of either kind, under any
    /// event name. Idempotent; removing an unknown id is a no-op.
    ///
    /// Every subscriber must call this before it goes away. Anything left
    /// behind is reported at broker teardown as [`DanglingSubscriptions`].
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.registry().remove_subscriber(id);
    }

    /// Returns `true` if `id` currently owns at least one subscription.
    pub fn contains_subscriber(&self, id: SubscriberId) -> bool {
        self.registry().contains_subscriber(id)
    }

    /// Invokes every signal subscription registered under `event` and
    /// returns how many were invoked. No matches is not an error; the
    /// result is 0.
    pub fn publish(&self, event: &str) -> usize {
        let snapshot = self.registry().matching_signal(event);
        for callable in &snapshot {
            callable();
        }
        snapshot.len()
    }

    /// Delivers `payload` to every payload subscription registered under
    /// `event` and returns how many accepted it.
    ///
    /// A subscription whose declared type does not match the payload's
    /// dynamic type is skipped: the mismatch is reported through the
    /// broker's [`Reporter`], naming the event, and the remaining matches
    /// still receive the dispatch. The count covers successful deliveries
    /// only.
    pub fn publish_with(&self, event: &str, payload: Payload) -> usize {
        let snapshot = self.registry().matching_payload(event);
        let mut delivered = 0;
        for callable in &snapshot {
            if callable(&payload) {
                delivered += 1;
            } else {
                self.inner.reporter.report(&TypeMismatch::new(event).to_string());
            }
        }
        delivered
    }

    /// Event names of every live subscription, signal subscriptions first.
    ///
    /// This is the teardown diagnostic view; an empty result means every
    /// subscriber has cleaned up.
    pub fn event_names(&self) -> Vec<String> {
        self.registry().event_names()
    }

    /// Fallible teardown: verifies that the registry is empty.
    ///
    /// If subscriptions are still registered, they are released and
    /// [`DanglingSubscriptions`] is returned listing every offending event
    /// name, so the host can decide whether to escalate. On success the
    /// broker is empty and safe to drop silently.
    pub fn drain(&self) -> Result<(), DanglingSubscriptions> {
        let mut registry = self.registry();
        if registry.is_empty() {
            return Ok(());
        }
        let events = registry.event_names();
        registry.clear();
        Err(DanglingSubscriptions::new(events))
    }

    /// Number of live subscriptions, both kinds.
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    /// Returns `true` if no subscriptions are registered.
    pub fn is_empty(&self) -> bool {
        self.registry().is_empty()
    }

    // Callbacks never run under this lock, so a poisoned guard still holds a
    // structurally sound registry; recover the inner value.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let registry = match self.registry.get_mut() {
            Ok(registry) => registry,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !registry.is_empty() {
            let dangling = DanglingSubscriptions::new(registry.event_names());
            self.reporter.report(&dangling.to_string());
            registry.clear();
        }
    }
}

static GLOBAL: OnceLock<Broker> = OnceLock::new();

/// Lazily-initialized process-wide broker.
///
/// For hosts that want singleton ergonomics; everyone calling `global()`
/// shares one registry. The global broker lives until process exit, so the
/// teardown check is the host's responsibility via
/// [`drain`](Broker::drain).
pub fn global() -> &'static Broker {
    GLOBAL.get_or_init(Broker::new)
}
