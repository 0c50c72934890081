//! Ordered request/response handler chain.
//!
//! Handlers are appended during start-up and never removed. Invocation order
//! is registration order, which for a discovered chain is provider order, so
//! repeated exchanges always run handlers in the same sequence. The first
//! fault stops the chain; handlers that already ran are not rolled back.

use std::fmt;
use std::sync::Arc;

use courier_config::Config;
use tracing::{debug, trace};

use crate::error::{ConfigError, HandlerError};
use crate::exchange::{Phase, RequestExchange, ResponseExchange};
use crate::handler::{RequestHandler, ResponseHandler};
use crate::provider::HandlerProviders;

/// Tracing target for chain operations.
const CHAIN_TARGET: &str = "courier_pipeline::chain";

/// Request and response handlers in invocation order.
///
/// Cloning is cheap: handlers are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct HandlerChain {
    request_handlers: Vec<Arc<dyn RequestHandler>>,
    response_handlers: Vec<Arc<dyn ResponseHandler>>,
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("request_handlers", &self.request_handler_names())
            .field("response_handlers", &self.response_handler_names())
            .finish()
    }
}

impl HandlerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain by asking every provider for its handler, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Provider`] for the first provider that fails;
    /// no chain is produced in that case.
    pub fn discover(config: &Config, providers: &HandlerProviders) -> Result<Self, ConfigError> {
        let mut chain = Self::new();

        for (position, provider) in providers.request_providers().enumerate() {
            let handler = provider
                .handler(config)
                .map_err(|source| ConfigError::Provider {
                    provider: provider.name().to_owned(),
                    phase: Phase::Request,
                    position,
                    source,
                })?;
            debug!(
                target: CHAIN_TARGET,
                provider = provider.name(),
                position,
                "registered request handler"
            );
            chain.add_request_handler(handler);
        }

        for (position, provider) in providers.response_providers().enumerate() {
            let handler = provider
                .handler(config)
                .map_err(|source| ConfigError::Provider {
                    provider: provider.name().to_owned(),
                    phase: Phase::Response,
                    position,
                    source,
                })?;
            debug!(
                target: CHAIN_TARGET,
                provider = provider.name(),
                position,
                "registered response handler"
            );
            chain.add_response_handler(handler);
        }

        Ok(chain)
    }

    /// Appends a request handler.
    pub fn add_request_handler(&mut self, handler: Arc<dyn RequestHandler>) {
        self.request_handlers.push(handler);
    }

    /// Appends a response handler.
    pub fn add_response_handler(&mut self, handler: Arc<dyn ResponseHandler>) {
        self.response_handlers.push(handler);
    }

    /// Runs every request handler in registration order.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] carrying the failing handler's position; the
    /// remaining handlers are not invoked.
    pub fn apply_request_handlers(
        &self,
        exchange: &mut RequestExchange,
    ) -> Result<(), HandlerError> {
        for (position, handler) in self.request_handlers.iter().enumerate() {
            trace!(target: CHAIN_TARGET, handler = handler.name(), position, "request handler");
            handler.handle_request(exchange).map_err(|fault| {
                HandlerError::new(Phase::Request, position, handler.name(), fault)
            })?;
        }
        Ok(())
    }

    /// Runs every response handler in registration order.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] carrying the failing handler's position; the
    /// remaining handlers are not invoked.
    pub fn apply_response_handlers(
        &self,
        exchange: &mut ResponseExchange,
    ) -> Result<(), HandlerError> {
        for (position, handler) in self.response_handlers.iter().enumerate() {
            trace!(target: CHAIN_TARGET, handler = handler.name(), position, "response handler");
            handler.handle_response(exchange).map_err(|fault| {
                HandlerError::new(Phase::Response, position, handler.name(), fault)
            })?;
        }
        Ok(())
    }

    /// Number of request handlers.
    #[must_use]
    pub const fn request_len(&self) -> usize {
        self.request_handlers.len()
    }

    /// Number of response handlers.
    #[must_use]
    pub const fn response_len(&self) -> usize {
        self.response_handlers.len()
    }

    /// Request handler names in invocation order.
    #[must_use]
    pub fn request_handler_names(&self) -> Vec<&str> {
        self.request_handlers.iter().map(|h| h.name()).collect()
    }

    /// Response handler names in invocation order.
    #[must_use]
    pub fn response_handler_names(&self) -> Vec<&str> {
        self.response_handlers.iter().map(|h| h.name()).collect()
    }
}
