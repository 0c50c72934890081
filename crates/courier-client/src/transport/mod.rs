//! Network transports.
//!
//! [`SocketTransport`] opens a fresh connection per exchange, writes one
//! request envelope, and waits a bounded time for one reply envelope. Tests
//! and alternative carriers plug in through the [`Transport`] trait.

mod connection;

use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_config::{Config, ServerEndpoint};
use courier_pipeline::ConfigError;
use tracing::trace;

use crate::envelope::Envelope;
use crate::error::TransportError;

use self::connection::{Connection, connect};

const TRANSPORT_TARGET: &str = "courier_client::transport";

/// Wait budgets for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Budget for establishing the connection.
    pub connect: Duration,
    /// Budget for the whole exchange: writing the request and reading the
    /// reply.
    pub request: Duration,
}

impl Timeouts {
    /// Reads both budgets from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] when either budget is zero;
    /// sockets cannot wait for no time at all.
    pub const fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let timeouts = Self {
            connect: config.connect_timeout(),
            request: config.request_timeout(),
        };
        if timeouts.connect.is_zero() {
            return Err(zero_budget("connect_timeout_secs"));
        }
        if timeouts.request.is_zero() {
            return Err(zero_budget("request_timeout_secs"));
        }
        Ok(timeouts)
    }
}

const fn zero_budget(setting: &'static str) -> ConfigError {
    ConfigError::InvalidSetting {
        setting,
        reason: "timeout must be at least one second",
    }
}

/// Carries one request envelope to a peer and returns its reply.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Performs one round trip.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the peer cannot be reached, the
    /// connection drops, the wait expires, or the reply is not an envelope.
    fn round_trip(
        &self,
        endpoint: &ServerEndpoint,
        request: &Envelope,
        timeouts: Timeouts,
    ) -> Result<Envelope, TransportError>;
}

/// Blocking TCP / Unix domain socket transport speaking JSONL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketTransport;

impl SocketTransport {
    /// Creates the transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for SocketTransport {
    fn round_trip(
        &self,
        endpoint: &ServerEndpoint,
        request: &Envelope,
        timeouts: Timeouts,
    ) -> Result<Envelope, TransportError> {
        let mut connection = connect(endpoint, timeouts.connect)?;
        let deadline = Deadline::after(timeouts.request);
        let dropped = |source: io::Error| classify(endpoint, timeouts.request, source);

        let mut frame = Vec::new();
        request.write_jsonl(&mut frame).map_err(dropped)?;
        write_frame(&mut connection, &frame, deadline).map_err(dropped)?;
        trace!(target: TRANSPORT_TARGET, %endpoint, "request written");

        let line = read_reply(connection, deadline).map_err(dropped)?;
        Envelope::from_line(&line).map_err(|source| TransportError::InvalidFrame {
            endpoint: endpoint.to_string(),
            source: Arc::new(source),
        })
    }
}

/// Point in time by which the whole exchange must finish.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Option<Instant>,
    budget: Duration,
}

impl Deadline {
    fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(budget),
            budget,
        }
    }

    /// Time left, or a `TimedOut` error once none remains.
    ///
    /// Sockets reject a zero timeout, so an exhausted budget never reaches
    /// them.
    fn remaining(self) -> io::Result<Duration> {
        let left = self.at.map_or(self.budget, |at| {
            at.saturating_duration_since(Instant::now())
        });
        if left.is_zero() {
            Err(io::Error::from(io::ErrorKind::TimedOut))
        } else {
            Ok(left)
        }
    }
}

fn write_frame(connection: &mut Connection, frame: &[u8], deadline: Deadline) -> io::Result<()> {
    let mut pending = frame;
    while !pending.is_empty() {
        connection.set_write_timeout(deadline.remaining()?)?;
        match connection.write(pending) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
            Ok(written) => pending = pending.get(written..).unwrap_or_default(),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    connection.flush()
}

fn read_reply(connection: Connection, deadline: Deadline) -> io::Result<String> {
    let mut reader = BufReader::new(connection);
    let mut line = Vec::new();
    loop {
        reader.get_ref().set_read_timeout(deadline.remaining()?)?;
        let (complete, used) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "peer closed the connection before replying",
                ));
            }
            match available.iter().position(|byte| *byte == b'\n') {
                Some(newline) => {
                    let (head, _) = available.split_at(newline + 1);
                    line.extend_from_slice(head);
                    (true, head.len())
                }
                None => {
                    line.extend_from_slice(available);
                    (false, available.len())
                }
            }
        };
        reader.consume(used);
        if complete {
            return String::from_utf8(line)
                .map_err(|source| io::Error::new(io::ErrorKind::InvalidData, source));
        }
    }
}

fn classify(endpoint: &ServerEndpoint, budget: Duration, source: io::Error) -> TransportError {
    match source.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => TransportError::TimedOut {
            endpoint: endpoint.to_string(),
            timeout: budget,
        },
        _ => TransportError::Dropped {
            endpoint: endpoint.to_string(),
            source: Arc::new(source),
        },
    }
}
