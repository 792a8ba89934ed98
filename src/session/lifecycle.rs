//! Connection Lifecycle Manager
//!
//! Owns the transport and the background worker thread, and drives the
//! state machine:
//!
//! ```text
//! Disconnected → Connecting → Connected → Disconnecting → Disconnected
//! ```
//!
//! Transient network failures (refused, reset, timed out) tear the
//! transport down and retry the whole cycle after the configured backoff.
//! Handshake failures — wrong banner, no banner at all, or a
//! non-network error while connecting — are fatal: the session falls to
//! `Disconnected` and stays there until respawned.
//!
//! Termination is cooperative: every blocking wait in the worker observes
//! the terminate flag at sub-second granularity.

use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::config::{Config, DnsPolicy};
use crate::error::{ResonaError, Result};
use crate::logging::{NetworkLog, TracingLog};
use crate::protocol::{Command, Keyword, Response, ResponseLine};
use crate::session::delivery::{channel as delivery_channel, Inbox, Outbox};
use crate::session::dispatcher::{
    drain_queue, read_to_terminal, run_connected, send_command, CoalesceSet, LoopExit,
    QueuedCommand,
};
use crate::session::transport::{connect, resolve, LineReader};
use crate::session::ConnectionState;

/// Product marker the banner must carry
const BANNER_PRODUCT: &str = "MPD";

/// Granularity at which backoff sleeps re-check the terminate flag
const TERMINATE_POLL: Duration = Duration::from_millis(100);

// =============================================================================
// Shared State Cell
// =============================================================================

/// The published connection state; written by the worker, read anywhere
struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        Self(AtomicU8::new(ConnectionState::Disconnected as u8))
    }

    fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Publish a new state; returns false when it was already current
    /// (retry loops re-enter `Connecting` without re-announcing it)
    fn set(&self, state: ConnectionState) -> bool {
        self.0.swap(state as u8, Ordering::AcqRel) != state as u8
    }
}

// =============================================================================
// Session Handle
// =============================================================================

/// Handle to one server session.
///
/// Spawning starts the background worker and the connect cycle
/// immediately; dropping the handle (or calling [`Session::shutdown`])
/// requests cooperative termination.
pub struct Session {
    queue_tx: Sender<QueuedCommand>,
    coalesce: Arc<CoalesceSet>,
    terminate: Arc<AtomicBool>,
    state: Arc<StateCell>,
    worker: Option<JoinHandle<()>>,
}

impl Session {
    /// Spawn a session worker with an explicit activity log sink.
    ///
    /// Returns the handle and the consumer-side [`Inbox`]; the consumer
    /// thread must pump the inbox to receive responses and notifications.
    pub fn spawn(config: Config, log: Arc<dyn NetworkLog>) -> (Self, Inbox) {
        let (queue_tx, queue_rx) = unbounded();
        let (outbox, inbox) = delivery_channel();
        let coalesce = Arc::new(CoalesceSet::new());
        let terminate = Arc::new(AtomicBool::new(false));
        let state = Arc::new(StateCell::new());

        let worker = {
            let coalesce = Arc::clone(&coalesce);
            let terminate = Arc::clone(&terminate);
            let state = Arc::clone(&state);
            thread::Builder::new()
                .name(format!("resona-session-{}", config.host))
                .spawn(move || {
                    worker_main(config, queue_rx, coalesce, outbox, log, terminate, state)
                })
                .expect("failed to spawn session worker thread")
        };

        (
            Self {
                queue_tx,
                coalesce,
                terminate,
                state,
                worker: Some(worker),
            },
            inbox,
        )
    }

    /// Spawn with the default `tracing`-backed log sink
    pub fn connect(config: Config) -> (Self, Inbox) {
        Self::spawn(config, Arc::new(TracingLog))
    }

    /// Enqueue a command; its callback is invoked exactly once on the
    /// consumer context when the response arrives.
    ///
    /// Redundant status/stats polls coalesce with one already pending:
    /// the duplicate is dropped (callback never invoked) and `Ok` is
    /// returned. If the connection drops before the response, the
    /// callback is likewise never invoked.
    pub fn send(
        &self,
        command: Command,
        callback: impl FnOnce(Response) + Send + 'static,
    ) -> Result<()> {
        if self.terminate.load(Ordering::Acquire) {
            return Err(ResonaError::SessionClosed);
        }

        let class = command.coalesce_class();
        if let Some(class) = class {
            if !self.coalesce.try_claim(class) {
                return Ok(());
            }
        }

        let queued = QueuedCommand {
            command,
            callback: Box::new(callback),
        };
        self.queue_tx.send(queued).map_err(|_| {
            if let Some(class) = class {
                self.coalesce.release(class);
            }
            ResonaError::SessionClosed
        })?;
        Ok(())
    }

    /// Current lifecycle state (read-only observation)
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Request cooperative termination and wait for the worker to finish
    /// its polite close
    pub fn shutdown(mut self) {
        self.terminate.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Cooperative: the worker notices within one poll interval.
        self.terminate.store(true, Ordering::Release);
    }
}

// =============================================================================
// Worker: the state machine
// =============================================================================

#[allow(clippy::too_many_arguments)]
fn worker_main(
    config: Config,
    queue: Receiver<QueuedCommand>,
    coalesce: Arc<CoalesceSet>,
    outbox: Outbox,
    log: Arc<dyn NetworkLog>,
    terminate: Arc<AtomicBool>,
    state: Arc<StateCell>,
) {
    let endpoint = format!("{}:{}", config.host, config.port);

    while !terminate.load(Ordering::Acquire) {
        if state.set(ConnectionState::Connecting) {
            outbox.state(ConnectionState::Connecting);
        }
        outbox.activity(format!("Connecting to {endpoint}"));
        log.milestone(&format!("connect attempt: {endpoint}"));

        let mut stream = match establish(&config) {
            Ok(stream) => stream,
            Err(e) if is_fatal(&e, config.dns_policy) => {
                tracing::warn!(%endpoint, error = %e, "connect failed fatally");
                outbox.error(format!("Connection failed: {e}"));
                break;
            }
            Err(e) => {
                tracing::debug!(%endpoint, error = %e, "connect failed, will retry");
                outbox.activity(format!("Connection failed: {e}, retrying"));
                backoff_sleep(config.backoff(), &terminate);
                continue;
            }
        };

        // Banner and authentication. Any failure here — wrong product
        // marker, EOF, timeout — is fatal, not retried.
        let mut reader = LineReader::new();
        let auth_error = match handshake(&mut stream, &mut reader, &config, &*log) {
            Ok(auth_error) => auth_error,
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "handshake failed");
                outbox.error(e.to_string());
                let _ = stream.shutdown(Shutdown::Both);
                break;
            }
        };
        if let Some(message) = auth_error {
            // The server refused the password; the connection stays up and
            // permission errors surface per command.
            outbox.error(format!("Authentication failed: {message}"));
        }

        if state.set(ConnectionState::Connected) {
            outbox.state(ConnectionState::Connected);
        }
        outbox.activity(format!("Connected to {endpoint}"));
        tracing::info!(%endpoint, "session connected");

        match run_connected(
            &mut stream,
            &mut reader,
            &queue,
            &coalesce,
            &outbox,
            &*log,
            &terminate,
        ) {
            Ok(LoopExit::Terminated) => {
                if state.set(ConnectionState::Disconnecting) {
                    outbox.state(ConnectionState::Disconnecting);
                }
                let _ = send_command(&mut stream, &Command::Close, &*log);
                let _ = stream.shutdown(Shutdown::Both);
                log.milestone("disconnected");
                break;
            }
            Err(e) => {
                tracing::warn!(%endpoint, error = %e, "connection lost");
                outbox.error(format!("Connection lost: {e}"));
                log.milestone("connection lost");
                let _ = stream.shutdown(Shutdown::Both);
                drain_queue(&queue, &coalesce);
                if state.set(ConnectionState::Disconnected) {
                    outbox.state(ConnectionState::Disconnected);
                }
                backoff_sleep(config.backoff(), &terminate);
            }
        }
    }

    drain_queue(&queue, &coalesce);
    if state.set(ConnectionState::Disconnected) {
        outbox.state(ConnectionState::Disconnected);
    }
    tracing::debug!(%endpoint, "session worker exited");
}

/// Resolve and connect with bounded waits
fn establish(config: &Config) -> Result<TcpStream> {
    let addr = resolve(config)?;
    let stream = connect(addr, config)?;
    Ok(stream)
}

/// Read and validate the banner, then authenticate if configured.
///
/// Returns `Ok(Some(message))` when the server answered the password
/// command with an error; transport and banner failures are `Err`.
fn handshake(
    stream: &mut TcpStream,
    reader: &mut LineReader,
    config: &Config,
    log: &dyn NetworkLog,
) -> Result<Option<String>> {
    let raw = reader.next_line(stream)?;
    log.received(&raw);

    let banner = ResponseLine::parse(raw);
    let accepted = banner.keyword() == Keyword::Ok
        && banner
            .value()
            .split_whitespace()
            .next()
            .is_some_and(|product| product == BANNER_PRODUCT);
    if !accepted {
        return Err(ResonaError::Handshake(format!(
            "unexpected banner: {:?}",
            banner.raw()
        )));
    }
    log.milestone(&format!("banner accepted: {}", banner.value()));

    if let Some(password) = &config.password {
        let command = Command::Password {
            password: password.clone(),
        };
        send_command(stream, &command, log)?;
        let (_lines, status) = read_to_terminal(stream, reader, log)?;
        return Ok(status.error().map(str::to_string));
    }

    Ok(None)
}

/// Fatality classification for connect-phase errors
fn is_fatal(error: &ResonaError, dns_policy: DnsPolicy) -> bool {
    match error {
        ResonaError::Resolve(_) => dns_policy == DnsPolicy::Fatal,
        other => !other.is_transient(),
    }
}

/// Sleep for the backoff interval, waking early on termination
fn backoff_sleep(total: Duration, terminate: &AtomicBool) {
    let deadline = Instant::now() + total;
    loop {
        if terminate.load(Ordering::Acquire) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep((deadline - now).min(TERMINATE_POLL));
    }
}
