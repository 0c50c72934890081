//! Transport client for the courier remoting substrate.
//!
//! A [`TransportClient`] owns one handler chain and one transcoder registry
//! and turns a typed command into a network exchange:
//!
//! 1. request handlers run over a fresh [`RequestExchange`](courier_pipeline::RequestExchange);
//! 2. the command is encoded and attached as the body;
//! 3. one [`Envelope`] is written to the peer and one is read back;
//! 4. response handlers run over the reply;
//! 5. the reply body is decoded into a command.
//!
//! Failures keep their origin: [`ClientError::Codec`],
//! [`ClientError::Handler`] and [`ClientError::Transport`] are never folded
//! into one another, and nothing is retried.

pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

#[cfg(test)]
mod tests;

pub use self::client::TransportClient;
pub use self::envelope::Envelope;
pub use self::error::{ClientError, TransportError};
pub use self::transport::{SocketTransport, Timeouts, Transport};
