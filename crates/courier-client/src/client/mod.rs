//! The transport client.
//!
//! One `send` is one exchange: request handlers, encoding, the network round
//! trip, response handlers, decoding. Each call builds its own exchange
//! objects, so a single client can serve many threads at once; the registry
//! and handler chain it shares are read-only after construction.

use std::any::type_name;
use std::sync::Arc;

use courier_config::{Config, ServerEndpoint};
use courier_pipeline::{
    ConfigError, HandlerChain, HandlerProviders, RequestExchange, ResponseExchange,
};
use courier_protocol::{CodecError, Command, TranscoderRegistry};
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::transport::{SocketTransport, Timeouts, Transport};

const CLIENT_TARGET: &str = "courier_client::client";

/// Sends commands to a courier peer.
#[derive(Clone)]
pub struct TransportClient {
    endpoint: ServerEndpoint,
    timeouts: Timeouts,
    registry: Arc<TranscoderRegistry>,
    chain: Arc<HandlerChain>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportClient")
            .field("endpoint", &self.endpoint)
            .field("timeouts", &self.timeouts)
            .field("registry", &self.registry)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl TransportClient {
    /// Builds a socket client, discovering handlers from `providers`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a timeout is zero or any provider fails;
    /// no client is built.
    pub fn connect(
        config: &Config,
        registry: Arc<TranscoderRegistry>,
        providers: &HandlerProviders,
    ) -> Result<Self, ConfigError> {
        Self::with_transport(config, registry, providers, Arc::new(SocketTransport::new()))
    }

    /// Builds a client over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a timeout is zero or any provider fails;
    /// no client is built.
    pub fn with_transport(
        config: &Config,
        registry: Arc<TranscoderRegistry>,
        providers: &HandlerProviders,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let timeouts = Timeouts::from_config(config)?;
        let chain = HandlerChain::discover(config, providers)?;
        debug!(
            target: CLIENT_TARGET,
            endpoint = %config.server_endpoint(),
            request_handlers = chain.request_len(),
            response_handlers = chain.response_len(),
            "transport client ready"
        );
        Ok(Self::from_parts(
            config.server_endpoint().clone(),
            timeouts,
            registry,
            Arc::new(chain),
            transport,
        ))
    }

    /// Assembles a client from already-built parts.
    #[must_use]
    pub const fn from_parts(
        endpoint: ServerEndpoint,
        timeouts: Timeouts,
        registry: Arc<TranscoderRegistry>,
        chain: Arc<HandlerChain>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            endpoint,
            timeouts,
            registry,
            chain,
            transport,
        }
    }

    /// Peer this client talks to.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Handler chain applied to every exchange.
    #[must_use]
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Sends `command` and returns the decoded reply.
    ///
    /// Request-phase side effects are not rolled back when a later step
    /// fails. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Handler`] for handler faults,
    /// [`ClientError::Codec`] when the command or reply cannot be transcoded
    /// (including a reply without a body), and [`ClientError::Transport`] for
    /// network failures.
    pub fn send(&self, command: &dyn Command) -> Result<Box<dyn Command>, ClientError> {
        let mut request = RequestExchange::new(self.endpoint.clone());
        self.chain.apply_request_handlers(&mut request)?;
        let encoded = self.registry.encode(command)?;
        let kind = self.registry.kind_of(command).unwrap_or_default();
        request.set_body(encoded);

        let (headers, body) = request.into_parts();
        let reply = self
            .transport
            .round_trip(&self.endpoint, &Envelope::new(headers, body), self.timeouts)
            .inspect_err(|error| {
                warn!(
                    target: CLIENT_TARGET,
                    endpoint = %self.endpoint,
                    %kind,
                    %error,
                    "exchange failed"
                );
            })?;

        let mut response = ResponseExchange::new(self.endpoint.clone(), reply.headers, reply.body);
        self.chain.apply_response_handlers(&mut response)?;
        let reply_body = response.take_body().ok_or(CodecError::MissingBody)?;
        let decoded = self.registry.decode(&reply_body)?;
        debug!(target: CLIENT_TARGET, %kind, reply = ?decoded, "exchange complete");
        Ok(decoded)
    }

    /// Sends `command` and requires a reply of type `C`.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus [`ClientError::UnexpectedResponse`] when
    /// the reply is another command type.
    pub fn send_as<C: Command>(&self, command: &dyn Command) -> Result<C, ClientError> {
        let reply = self.send(command)?;
        let received = format!("{reply:?}");
        reply
            .downcast::<C>()
            .map(|typed| *typed)
            .ok_or(ClientError::UnexpectedResponse {
                expected: type_name::<C>(),
                received,
            })
    }
}
