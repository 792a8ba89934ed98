//! Command Queue & Dispatcher
//!
//! The single authority for what goes on the wire next. Commands arrive on
//! an unbounded FIFO channel; the dispatcher writes exactly one at a time,
//! reads its response to the terminal line, and routes the finished
//! response to the callback enqueued with it. Ordering is the only
//! correlation mechanism the wire offers, so the loop never has more than
//! one command in flight.
//!
//! An `ACK` terminal is a normal, delivered response — the loop proceeds
//! to the next command on the same connection. Write failures and read
//! timeouts are transport failures: the loop returns the error and the
//! lifecycle manager tears the connection down.

use std::collections::HashSet;
use std::io::Write;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;

use crate::error::Result;
use crate::logging::NetworkLog;
use crate::protocol::{
    assemble, CoalesceClass, Command, Response, ResponseLine, ResponseShape, ResponseStatus,
};
use crate::session::delivery::Outbox;
use crate::session::transport::LineReader;

/// How long one dequeue wait blocks before re-checking the terminate flag
pub(crate) const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A command paired with the callback that consumes its response
pub(crate) struct QueuedCommand {
    pub(crate) command: Command,
    pub(crate) callback: Box<dyn FnOnce(Response) + Send>,
}

/// Why the connected loop stopped without a transport error
pub(crate) enum LoopExit {
    /// Termination was requested; the connection is still healthy
    Terminated,
}

// =============================================================================
// Coalescing
// =============================================================================

/// Claim set for the redundant-poll optimization.
///
/// A status/stats refresh is claimed at enqueue time and released only
/// after its response is delivered (or the queue is drained on teardown),
/// so overlapping refresh requests from the consumer collapse into one
/// round trip. Commands outside the two polling classes never touch this.
#[derive(Default)]
pub(crate) struct CoalesceSet {
    claimed: Mutex<HashSet<CoalesceClass>>,
}

impl CoalesceSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim the class; `false` means an equivalent poll is already
    /// queued or in flight and the new one should be dropped
    pub(crate) fn try_claim(&self, class: CoalesceClass) -> bool {
        self.claimed.lock().insert(class)
    }

    pub(crate) fn release(&self, class: CoalesceClass) {
        self.claimed.lock().remove(&class);
    }
}

// =============================================================================
// Connected Loop
// =============================================================================

/// Run the command/response loop over a connected stream.
///
/// Returns `Ok(Terminated)` on a termination request, `Err` on a transport
/// failure. Either way the in-flight command's callback, if any was being
/// served, has already been delivered or will never be invoked.
pub(crate) fn run_connected(
    stream: &mut TcpStream,
    reader: &mut LineReader,
    queue: &Receiver<QueuedCommand>,
    coalesce: &CoalesceSet,
    outbox: &Outbox,
    log: &dyn NetworkLog,
    terminate: &AtomicBool,
) -> Result<LoopExit> {
    loop {
        if terminate.load(Ordering::Acquire) {
            return Ok(LoopExit::Terminated);
        }

        let queued = match queue.recv_timeout(QUEUE_POLL_INTERVAL) {
            Ok(queued) => queued,
            Err(RecvTimeoutError::Timeout) => continue,
            // All senders gone: the session handle was dropped.
            Err(RecvTimeoutError::Disconnected) => return Ok(LoopExit::Terminated),
        };

        let coalesce_class = queued.command.coalesce_class();
        let result = exchange(stream, reader, queued, outbox, log);

        // The claim covers queued-or-in-flight; the cycle is over either
        // way once exchange returns.
        if let Some(class) = coalesce_class {
            coalesce.release(class);
        }

        result?;
    }
}

/// Write one command and deliver its response.
///
/// On a transport error the callback is dropped un-invoked: the lifecycle
/// manager surfaces the failure as a state transition instead.
fn exchange(
    stream: &mut TcpStream,
    reader: &mut LineReader,
    queued: QueuedCommand,
    outbox: &Outbox,
    log: &dyn NetworkLog,
) -> Result<()> {
    let QueuedCommand { command, callback } = queued;

    send_command(stream, &command, log)?;
    let (lines, status) = read_to_terminal(stream, reader, log)?;

    let response = match command.response_shape() {
        ResponseShape::Lines => Response::Lines { lines, status },
        ResponseShape::Entities => Response::Entities {
            playlist: command.playlist_name().map(str::to_string),
            blocks: assemble(&lines),
            status,
        },
    };

    if let Some(error) = response.status().error() {
        tracing::debug!(command = command.operation(), %error, "command failed");
    }

    outbox.invoke(move || callback(response));
    Ok(())
}

/// Serialize and write one command line
pub(crate) fn send_command(
    stream: &mut TcpStream,
    command: &Command,
    log: &dyn NetworkLog,
) -> Result<()> {
    let mut line = command.wire();
    line.push('\n');
    stream.write_all(line.as_bytes())?;
    log.sent(&command.loggable());
    Ok(())
}

/// Read classified lines until the terminal status line
pub(crate) fn read_to_terminal(
    stream: &mut TcpStream,
    reader: &mut LineReader,
    log: &dyn NetworkLog,
) -> Result<(Vec<ResponseLine>, ResponseStatus)> {
    let mut lines = Vec::new();
    loop {
        let raw = reader.next_line(stream)?;
        log.received(&raw);

        let line = ResponseLine::parse(raw);
        if line.is_terminal() {
            return Ok((lines, ResponseStatus::from_terminal(&line)));
        }
        lines.push(line);
    }
}

/// Discard every pending command, releasing coalesce claims.
///
/// Callbacks of discarded commands are never invoked; pending work does
/// not survive a reconnect.
pub(crate) fn drain_queue(queue: &Receiver<QueuedCommand>, coalesce: &CoalesceSet) -> usize {
    let mut dropped = 0;
    while let Ok(queued) = queue.try_recv() {
        if let Some(class) = queued.command.coalesce_class() {
            coalesce.release(class);
        }
        dropped += 1;
    }
    if dropped > 0 {
        tracing::debug!(dropped, "discarded pending commands on teardown");
    }
    dropped
}
