//! In-process publish/subscribe notification broker.
//!
//! Subscribers register interest in a named event under one of two contracts:
//! a bare signal (no payload) or a typed payload delivered through runtime
//! type-erasure. Producers publish the name; the [`Broker`] synchronously
//! invokes every matching subscription and returns how many it invoked.
//!
//! # Example
//!
//! ```rust,ignore
//! use event_broker::{Broker, Payload};
//!
//! let broker = Broker::new();
//! let id = broker.subscriber_id();
//!
//! broker.subscribe_signal(id, "Ready", || println!("ready"));
//! broker.subscribe_ref(id, "Data", |s: &String| println!("got {s}"));
//!
//! assert_eq!(broker.publish("Ready"), 1);
//! assert_eq!(broker.publish_with("Data", Payload::new(String::from("hi"))), 1);
//!
//! broker.unsubscribe(id);
//! broker.drain().unwrap();
//! ```

pub mod broker;
pub mod error;
pub mod payload;
pub mod report;

pub(crate) mod registry;

pub use broker::{Broker, global};
pub use error::{DanglingSubscriptions, TypeMismatch};
pub use payload::Payload;
pub use registry::SubscriberId;
pub use report::{ChannelReporter, LogReporter, Reporter};
