//! The report capability: where the broker sends error diagnostics.
//!
//! The broker itself never decides how diagnostics are formatted or routed;
//! it hands a finished message to a [`Reporter`]. The default routes to the
//! `log` facade at error level. [`ChannelReporter`] captures messages on a
//! channel instead, which is what the tests use.

use crossbeam::channel::{Receiver, Sender, unbounded};

/// Sink for broker error diagnostics (type mismatches, dangling
/// subscriptions at teardown).
pub trait Reporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Routes diagnostics to `log::error!`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Captures diagnostics on a crossbeam channel.
pub struct ChannelReporter {
    sender: Sender<String>,
}

impl ChannelReporter {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }

    pub fn with_receiver() -> (Self, Receiver<String>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender), receiver)
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, message: &str) {
        let _ = self.sender.try_send(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_reporter_captures_messages_in_order() {
        let (reporter, receiver) = ChannelReporter::with_receiver();

        reporter.report("first");
        reporter.report("second");

        assert_eq!(receiver.try_recv().as_deref(), Ok("first"));
        assert_eq!(receiver.try_recv().as_deref(), Ok("second"));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn channel_reporter_survives_a_dropped_receiver() {
        let (reporter, receiver) = ChannelReporter::with_receiver();
        drop(receiver);

        // Nothing to assert beyond "does not panic".
        reporter.report("into the void");
    }
}
