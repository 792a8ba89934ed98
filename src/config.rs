//! Configuration for a Resona session
//!
//! Centralized configuration with sensible defaults. The session worker
//! receives an immutable copy at spawn time; nothing in the core reads
//! ambient/global settings.

/// Main configuration for one server session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Endpoint
    // -------------------------------------------------------------------------
    /// Server hostname or address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    /// Optional password sent right after the banner.
    ///
    /// The value arrives here already decrypted; credential storage and
    /// decryption live outside the session core.
    pub password: Option<String>,

    // -------------------------------------------------------------------------
    // Timing
    // -------------------------------------------------------------------------
    /// Shared timeout for connect, send, and receive (milliseconds)
    pub timeout_ms: u64,

    /// Delay before retrying a failed connection attempt (milliseconds)
    pub backoff_ms: u64,

    // -------------------------------------------------------------------------
    // Failure Policy
    // -------------------------------------------------------------------------
    /// How a hostname resolution failure during connect is classified
    pub dns_policy: DnsPolicy,
}

/// Classification of a DNS/host resolution failure during connect.
///
/// The observable behavior of servers on flaky networks does not pin this
/// down, so it is explicit configuration rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsPolicy {
    /// Give up: resolution failure ends the session without retrying
    Fatal,

    /// Treat like any transient network error: back off and retry
    Retry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
            password: None,
            timeout_ms: 10_000,
            backoff_ms: 5_000,
            dns_policy: DnsPolicy::Fatal,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The shared connect/send/receive timeout as a `Duration`
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// The reconnect backoff as a `Duration`
    pub fn backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.backoff_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server hostname
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the password (already decrypted by the caller)
    pub fn password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.config.password = if password.is_empty() {
            None
        } else {
            Some(password)
        };
        self
    }

    /// Set the shared connect/send/receive timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set the reconnect backoff interval (in milliseconds)
    pub fn backoff_ms(mut self, ms: u64) -> Self {
        self.config.backoff_ms = ms;
        self
    }

    /// Set the DNS failure policy
    pub fn dns_policy(mut self, policy: DnsPolicy) -> Self {
        self.config.dns_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
