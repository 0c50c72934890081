//! Errors surfaced by the transport client.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use courier_pipeline::HandlerError;
use courier_protocol::CodecError;
use thiserror::Error;

/// Network failures. Every variant names the endpoint involved.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The host name could not be resolved.
    #[error("failed to resolve server address {endpoint}: {source}")]
    Resolve {
        /// Endpoint being contacted.
        endpoint: String,
        /// Resolver error.
        source: Arc<io::Error>,
    },
    /// No connection could be established.
    #[error("failed to connect to server at {endpoint}: {source}")]
    Connect {
        /// Endpoint being contacted.
        endpoint: String,
        /// Socket error.
        source: Arc<io::Error>,
    },
    /// The connection was lost after it had been established.
    #[error("connection to {endpoint} dropped mid-exchange: {source}")]
    Dropped {
        /// Endpoint being contacted.
        endpoint: String,
        /// Socket error, or `UnexpectedEof` when the peer closed early.
        source: Arc<io::Error>,
    },
    /// The bounded wait for a reply expired.
    #[error("no reply from {endpoint} within {timeout:?}")]
    TimedOut {
        /// Endpoint being contacted.
        endpoint: String,
        /// Budget that expired.
        timeout: Duration,
    },
    /// The reply line was not an envelope.
    #[error("invalid reply frame from {endpoint}: {source}")]
    InvalidFrame {
        /// Endpoint being contacted.
        endpoint: String,
        /// Parse error.
        source: Arc<serde_json::Error>,
    },
    /// Unix domain sockets are not available on this platform.
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
}

impl TransportError {
    /// Returns `true` when no connection was ever established.
    #[must_use]
    pub const fn is_no_connection(&self) -> bool {
        matches!(
            self,
            Self::Resolve { .. } | Self::Connect { .. } | Self::UnsupportedUnixTransport(_)
        )
    }
}

/// Failures of [`TransportClient::send`](crate::TransportClient::send).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The command or reply could not be transcoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A request or response handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
    /// The network exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The reply decoded to a different command type than requested.
    #[error("expected a '{expected}' reply but received {received}")]
    UnexpectedResponse {
        /// Requested Rust type.
        expected: &'static str,
        /// Debug rendering of the received command.
        received: String,
    },
}
