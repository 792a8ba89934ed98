//! Cross-Thread Result Delivery
//!
//! The background worker produces finished responses and lifecycle
//! notifications; the single-threaded consumer must observe them on its
//! own context, in production order. Each production is one send on an
//! unbounded channel — the worker never blocks on the consumer — and the
//! consumer drains the channel from its own thread via [`Inbox::pump`].

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::session::ConnectionState;

/// A lifecycle side channel item: state transitions and human-readable
/// activity/error text for status-line display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The connection state changed
    State(ConnectionState),

    /// Routine activity text ("Connecting to ...", "Connected")
    Activity(String),

    /// The most recent error text; takes display priority over activity
    Error(String),
}

/// One marshaled item crossing to the consumer thread
pub(crate) enum Delivery {
    /// A response callback, already bound to its response
    Invoke(Box<dyn FnOnce() + Send>),

    /// A lifecycle notification
    Notice(Notification),
}

/// Producer half, held by background workers
#[derive(Clone)]
pub(crate) struct Outbox {
    tx: Sender<Delivery>,
}

impl Outbox {
    /// Marshal a bound response callback; fire-and-forget
    pub(crate) fn invoke(&self, f: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Delivery::Invoke(Box::new(f)));
    }

    pub(crate) fn state(&self, state: ConnectionState) {
        let _ = self.tx.send(Delivery::Notice(Notification::State(state)));
    }

    pub(crate) fn activity(&self, text: impl Into<String>) {
        let _ = self
            .tx
            .send(Delivery::Notice(Notification::Activity(text.into())));
    }

    pub(crate) fn error(&self, text: impl Into<String>) {
        let _ = self
            .tx
            .send(Delivery::Notice(Notification::Error(text.into())));
    }
}

/// Consumer half: the single-threaded context drains this on its own
/// schedule
pub struct Inbox {
    rx: Receiver<Delivery>,
}

impl Inbox {
    /// Run every pending delivery on the calling thread, in production
    /// order. Response callbacks execute here; notifications are handed to
    /// `notice`. Returns the number of items processed.
    pub fn pump<F: FnMut(Notification)>(&self, mut notice: F) -> usize {
        let mut processed = 0;
        for item in self.rx.try_iter() {
            match item {
                Delivery::Invoke(callback) => callback(),
                Delivery::Notice(n) => notice(n),
            }
            processed += 1;
        }
        processed
    }

    /// Block up to `timeout` for the next delivery, then drain as `pump`.
    ///
    /// Convenience for consumers without their own run loop (the CLI,
    /// tests); UI consumers normally call [`Inbox::pump`] from their event
    /// loop instead.
    pub fn pump_wait<F: FnMut(Notification)>(
        &self,
        timeout: std::time::Duration,
        mut notice: F,
    ) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(Delivery::Invoke(callback)) => callback(),
            Ok(Delivery::Notice(n)) => notice(n),
            Err(_) => return 0,
        }
        1 + self.pump(notice)
    }
}

/// Create a connected delivery pair
pub(crate) fn channel() -> (Outbox, Inbox) {
    let (tx, rx) = unbounded();
    (Outbox { tx }, Inbox { rx })
}
