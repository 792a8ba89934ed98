//! Network activity log sink
//!
//! Best-effort observation of the wire: every sent command, every received
//! line, and every lifecycle milestone. Sinks are infallible by signature —
//! nothing an implementation does can affect protocol correctness — and
//! the default methods make every notification optional.

/// Receives wire-level activity notifications from a session worker.
///
/// Called from the background thread; implementations must not block.
pub trait NetworkLog: Send + Sync {
    /// A command line was written (credentials already masked)
    fn sent(&self, _line: &str) {}

    /// A response line arrived
    fn received(&self, _line: &str) {}

    /// A lifecycle milestone: connect attempt, banner, disconnect
    fn milestone(&self, _event: &str) {}
}

/// Discards everything
pub struct NullLog;

impl NetworkLog for NullLog {}

/// Forwards wire traffic to `tracing` at trace level, milestones at debug
pub struct TracingLog;

impl NetworkLog for TracingLog {
    fn sent(&self, line: &str) {
        tracing::trace!(target: "resona::wire", ">> {line}");
    }

    fn received(&self, line: &str) {
        tracing::trace!(target: "resona::wire", "<< {line}");
    }

    fn milestone(&self, event: &str) {
        tracing::debug!(target: "resona::wire", "{event}");
    }
}
