//! Handler capabilities.
//!
//! Handlers are shared by every concurrent `send`, so they take `&self` and
//! must be `Send + Sync`. State they need across calls (a session store, a
//! cookie jar) is injected at construction and owned elsewhere.
//!
//! Plain closures implement both traits, which keeps tests and one-off
//! concerns short.

use crate::error::HandlerFault;
use crate::exchange::{RequestExchange, ResponseExchange};

/// Runs before the network call and may mutate the outgoing exchange.
pub trait RequestHandler: Send + Sync {
    /// Inspects or mutates the outgoing exchange.
    ///
    /// # Errors
    ///
    /// A returned fault aborts the chain and the `send` call.
    fn handle_request(&self, exchange: &mut RequestExchange) -> Result<(), HandlerFault>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Runs after the reply arrived and may mutate the incoming exchange.
pub trait ResponseHandler: Send + Sync {
    /// Inspects or mutates the incoming exchange.
    ///
    /// # Errors
    ///
    /// A returned fault aborts the chain and the `send` call.
    fn handle_response(&self, exchange: &mut ResponseExchange) -> Result<(), HandlerFault>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> RequestHandler for F
where
    F: Fn(&mut RequestExchange) -> Result<(), HandlerFault> + Send + Sync,
{
    fn handle_request(&self, exchange: &mut RequestExchange) -> Result<(), HandlerFault> {
        self(exchange)
    }
}

impl<F> ResponseHandler for F
where
    F: Fn(&mut ResponseExchange) -> Result<(), HandlerFault> + Send + Sync,
{
    fn handle_response(&self, exchange: &mut ResponseExchange) -> Result<(), HandlerFault> {
        self(exchange)
    }
}
