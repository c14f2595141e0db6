//! Type-erased payload values.
//!
//! This module provides [`Payload`], the container a producer wraps a value in
//! before handing it to [`Broker::publish_with`](crate::Broker::publish_with).
//! The concrete type is erased behind `dyn Any`; each payload subscription
//! recovers it at dispatch time with a checked downcast.
//!
//! # Type Erasure
//!
//! A `Payload` holds `Arc<dyn Any + Send + Sync>`, so one published value can
//! be delivered to any number of subscriptions without copying. Subscriptions
//! declare the type they accept when they register:
//!
//! - **Value shape** ([`subscribe_value`](crate::Broker::subscribe_value)):
//!   the callback takes `T` by value and receives a clone per delivery.
//! - **Reference shape** ([`subscribe_ref`](crate::Broker::subscribe_ref)):
//!   the callback borrows `&T` straight out of the payload.
//!
//! If the payload's dynamic type does not match the declared `T`, that one
//! subscription is skipped and a type mismatch is reported; other matching
//! subscriptions still receive the dispatch.
//!
//! # Example
//!
//! ```rust,ignore
//! let broker = Broker::new();
//! let id = broker.subscriber_id();
//!
//! broker.subscribe_ref(id, "Score", |points: &u32| {
//!     println!("scored {points}");
//! });
//!
//! broker.publish_with("Score", Payload::new(42u32));
//! broker.unsubscribe(id);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased, shareable payload value.
///
/// Cloning a `Payload` is cheap; clones share the same underlying value.
/// The wrapped type must be `Send + Sync` because a payload may cross thread
/// boundaries on its way from producer to subscriber.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
}

impl Payload {
    /// Wraps a value for publishing.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Returns `true` if the wrapped value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the wrapped value as `T`, or `None` if the dynamic type
    /// does not match.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Type Checks ====================

    #[test]
    fn is_matches_wrapped_type() {
        let payload = Payload::new(7u32);

        assert!(payload.is::<u32>());
        assert!(!payload.is::<i32>());
        assert!(!payload.is::<String>());
    }

    #[test]
    fn downcast_ref_returns_value_for_matching_type() {
        let payload = Payload::new(String::from("hello"));

        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("hello"));
    }

    #[test]
    fn downcast_ref_returns_none_for_wrong_type() {
        let payload = Payload::new(3.5f64);

        assert!(payload.downcast_ref::<f32>().is_none());
    }

    // ==================== Sharing ====================

    #[test]
    fn clones_share_the_same_value() {
        let payload = Payload::new(vec![1, 2, 3]);
        let other = payload.clone();

        let a: *const Vec<i32> = payload.downcast_ref::<Vec<i32>>().unwrap();
        let b: *const Vec<i32> = other.downcast_ref::<Vec<i32>>().unwrap();
        assert_eq!(a, b);
    }
}
