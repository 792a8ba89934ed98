//! Error types for Resona
//!
//! Provides a unified error type for all operations.
//!
//! Expected parse failures (unrecognized keywords, unparsable numeric
//! values) are *not* errors — they degrade to sentinels at the call site.
//! This enum covers transport, handshake, and configuration failures only.

use thiserror::Error;

/// Result type alias using ResonaError
pub type Result<T> = std::result::Result<T, ResonaError>;

/// Unified error type for Resona operations
#[derive(Debug, Error)]
pub enum ResonaError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Host resolution failed: {0}")]
    Resolve(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Connection closed by server")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Session is shut down")]
    SessionClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResonaError {
    /// Whether this failure warrants teardown-and-retry rather than giving up.
    ///
    /// Socket-level failures (refused, reset, timed out, EOF) are transient:
    /// the lifecycle manager backs off and reconnects. Everything else —
    /// bad banner, configuration mistakes, resolution failures under the
    /// `Fatal` DNS policy — ends the session.
    pub fn is_transient(&self) -> bool {
        match self {
            ResonaError::Io(e) => is_transient_io(e),
            ResonaError::ConnectionClosed => true,
            _ => false,
        }
    }
}

/// Classify an I/O error as transient (network weather) or fatal.
pub(crate) fn is_transient_io(e: &std::io::Error) -> bool {
    use std::io::ErrorKind;
    matches!(
        e.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::TimedOut
            | ErrorKind::WouldBlock
            | ErrorKind::UnexpectedEof
            | ErrorKind::Interrupted
    )
}
