//! # Resona
//!
//! A protocol session engine for MPD-style line-protocol audio servers:
//! - Incremental, UTF-8-safe line framing over raw socket reads
//! - A fixed command set owning its own wire serialization
//! - Strict FIFO request/response correlation, one command in flight
//! - Connection lifecycle with banner handshake, auth, and
//!   reconnect-with-backoff
//! - Order-preserving result delivery to a single-threaded consumer
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Consumer Thread (UI)                        │
//! │        Session::send(cmd, callback)   Inbox::pump()          │
//! └───────────────┬─────────────────────────────▲───────────────┘
//!                 │ command queue               │ delivery queue
//! ┌───────────────▼─────────────────────────────┴───────────────┐
//! │                  Session Worker Thread                       │
//! │   Lifecycle ──► Dispatcher ──► Framer/Classifier/Blocks      │
//! │   (connect, banner, auth,      (one command in flight,       │
//! │    backoff, close)              read to terminal status)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │  TCP Stream  │
//!               └──────────────┘
//! ```
//!
//! The queue and delivery channels make the FIFO ordering structural:
//! commands leave in enqueue order, responses are matched purely by that
//! order (the wire has no correlation IDs), and callbacks run on the
//! consumer thread in arrival order.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod logging;
pub mod protocol;
pub mod search;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, DnsPolicy};
pub use error::{ResonaError, Result};
pub use logging::{NetworkLog, NullLog, TracingLog};
pub use protocol::{Command, EntityBlock, EntityKind, Response, ResponseStatus};
pub use search::SearchWorker;
pub use session::{ConnectionState, Inbox, Notification, Session};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Resona
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
