//! Session Module
//!
//! The connection layer: one background worker per session owns the
//! socket, drives the lifecycle state machine and the command/response
//! loop, and marshals results back to the single-threaded consumer.
//!
//! ## Architecture
//! - [`lifecycle`]: connect → banner → auth → command loop → close,
//!   with backoff-then-retry on transient failures
//! - [`dispatcher`]: FIFO command queue, one command in flight, response
//!   routing by command identity
//! - [`delivery`]: order-preserving cross-thread handoff to the consumer
//! - [`transport`]: socket setup and the stream→framer line bridge

pub(crate) mod delivery;
pub(crate) mod dispatcher;
pub(crate) mod lifecycle;
pub(crate) mod transport;

pub use delivery::{Inbox, Notification};
pub use lifecycle::Session;

/// Connection lifecycle state, owned by the session worker and observed
/// read-only by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Initial state, and terminal state of every cycle
    Disconnected = 0,
    /// Transport being established (including backoff between attempts)
    Connecting = 1,
    /// Banner accepted, command loop running
    Connected = 2,
    /// Polite close in progress
    Disconnecting = 3,
}

impl ConnectionState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Disconnecting,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Human-readable description for status-line display
    pub fn describe(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnecting => "Disconnecting...",
        }
    }
}
