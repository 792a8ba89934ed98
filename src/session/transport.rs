//! Transport plumbing
//!
//! Socket setup and the line-reading bridge between a connected stream and
//! the framer. All waits are bounded by the configured timeout; a timeout
//! mid-response is a transport failure, not a recoverable condition.

use std::io::Read;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{ResonaError, Result};
use crate::protocol::LineFramer;

/// Fixed receive window per read call
pub(crate) const RECV_BUFFER_SIZE: usize = 4096;

/// Resolve the configured endpoint to a socket address.
///
/// Resolution failure is reported as [`ResonaError::Resolve`]; the
/// lifecycle manager applies the configured DNS policy to it.
pub(crate) fn resolve(config: &Config) -> Result<SocketAddr> {
    let endpoint = (config.host.as_str(), config.port);
    endpoint
        .to_socket_addrs()
        .map_err(|e| ResonaError::Resolve(format!("{}:{}: {}", config.host, config.port, e)))?
        .next()
        .ok_or_else(|| {
            ResonaError::Resolve(format!("{}:{}: no addresses", config.host, config.port))
        })
}

/// Open a stream to `addr` with bounded connect and configured read/write
/// timeouts
pub(crate) fn connect(addr: SocketAddr, config: &Config) -> Result<TcpStream> {
    let stream = TcpStream::connect_timeout(&addr, config.timeout())?;
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(config.timeout()))?;
    stream.set_write_timeout(Some(config.timeout()))?;
    Ok(stream)
}

/// Pulls complete lines off a stream through a framer.
///
/// Owns the receive window and any lines decoded ahead of the current
/// request; both live and die with one connection.
pub(crate) struct LineReader {
    framer: LineFramer,
    ready: std::collections::VecDeque<String>,
}

impl LineReader {
    pub(crate) fn new() -> Self {
        Self {
            framer: LineFramer::new(),
            ready: std::collections::VecDeque::new(),
        }
    }

    /// Block for the next complete line (bounded by the stream's read
    /// timeout). EOF surfaces as [`ResonaError::ConnectionClosed`].
    pub(crate) fn next_line(&mut self, stream: &mut TcpStream) -> Result<String> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(line);
            }

            let mut buf = [0u8; RECV_BUFFER_SIZE];
            let n = stream.read(&mut buf)?;
            if n == 0 {
                return Err(ResonaError::ConnectionClosed);
            }
            self.ready.extend(self.framer.feed(&buf[..n]));
        }
    }
}
