//! Error types for dispatch and teardown.

use std::error::Error;
use std::fmt;

/// A published payload's dynamic type did not match what one subscription's
/// callback was registered to accept.
///
/// Local to that subscription: the rest of the dispatch pass still runs, and
/// the publish call reports the mismatch instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    event: String,
}

impl TypeMismatch {
    pub(crate) fn new(event: &str) -> Self {
        Self {
            event: event.to_string(),
        }
    }

    /// The event name the mismatched subscription was registered under.
    pub fn event(&self) -> &str {
        &self.event
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "notification payload for \"{}\" has invalid type for bound callback",
            self.event
        )
    }
}

impl Error for TypeMismatch {}

/// Subscriptions were still registered when the broker was torn down.
///
/// This is a programmer-error signal: every subscriber must unsubscribe
/// before it goes away, otherwise later dispatches would have invoked a
/// callback whose owner no longer exists. Carries the event name of every
/// offending subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingSubscriptions {
    events: Vec<String>,
}

impl DanglingSubscriptions {
    pub(crate) fn new(events: Vec<String>) -> Self {
        Self { events }
    }

    /// Event names of the subscriptions left behind, one entry per
    /// subscription.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Number of subscriptions left behind.
    pub fn count(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for DanglingSubscriptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = self.events.iter().map(|e| format!("\"{e}\"")).collect();
        write!(
            f,
            "notification broker has {} subscriptions left for events: {}",
            self.events.len(),
            names.join(", ")
        )
    }
}

impl Error for DanglingSubscriptions {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_the_event() {
        let err = TypeMismatch::new("Data");

        assert_eq!(err.event(), "Data");
        assert_eq!(
            err.to_string(),
            "notification payload for \"Data\" has invalid type for bound callback"
        );
    }

    #[test]
    fn dangling_lists_every_event_and_the_count() {
        let err = DanglingSubscriptions::new(vec!["Done".into(), "Data".into()]);

        assert_eq!(err.count(), 2);
        assert_eq!(err.events(), ["Done", "Data"]);
        assert_eq!(
            err.to_string(),
            "notification broker has 2 subscriptions left for events: \"Done\", \"Data\""
        );
    }
}
