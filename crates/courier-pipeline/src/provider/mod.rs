//! Handler providers and the ordered discovery list.
//!
//! A provider is the unit of pluggability: it owns whatever collaborator its
//! handler needs and builds the handler from the active configuration.
//! Providers are collected explicitly into [`HandlerProviders`]; production
//! wiring uses [`standard_providers`], tests assemble their own lists.

use std::fmt;
use std::sync::Arc;

use courier_config::Config;

use crate::cookie::{CookieHandler, CookieRequestHandlerProvider, CookieResponseHandlerProvider};
use crate::error::ProviderError;
use crate::handler::{RequestHandler, ResponseHandler};
use crate::session::{
    ClientSessionRequestHandlerProvider, ClientSessionResponseHandlerProvider, SessionStore,
};

/// Builds a request handler from configuration.
pub trait RequestHandlerProvider: Send + Sync {
    /// Name used in diagnostics and start-up errors.
    fn name(&self) -> &str;

    /// Constructs the handler.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the handler cannot be built; discovery
    /// treats this as fatal.
    fn handler(&self, config: &Config) -> Result<Arc<dyn RequestHandler>, ProviderError>;
}

/// Builds a response handler from configuration.
pub trait ResponseHandlerProvider: Send + Sync {
    /// Name used in diagnostics and start-up errors.
    fn name(&self) -> &str;

    /// Constructs the handler.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the handler cannot be built; discovery
    /// treats this as fatal.
    fn handler(&self, config: &Config) -> Result<Arc<dyn ResponseHandler>, ProviderError>;
}

/// Providers in discovery order.
#[derive(Clone, Default)]
pub struct HandlerProviders {
    request: Vec<Arc<dyn RequestHandlerProvider>>,
    response: Vec<Arc<dyn ResponseHandlerProvider>>,
}

impl fmt::Debug for HandlerProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerProviders")
            .field("request", &self.request_providers().map(|p| p.name()).collect::<Vec<_>>())
            .field("response", &self.response_providers().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerProviders {
    /// Creates an empty provider list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request-handler provider.
    pub fn push_request(&mut self, provider: Arc<dyn RequestHandlerProvider>) {
        self.request.push(provider);
    }

    /// Appends a response-handler provider.
    pub fn push_response(&mut self, provider: Arc<dyn ResponseHandlerProvider>) {
        self.response.push(provider);
    }

    /// Builder-style [`push_request`](Self::push_request).
    #[must_use]
    pub fn with_request(mut self, provider: Arc<dyn RequestHandlerProvider>) -> Self {
        self.push_request(provider);
        self
    }

    /// Builder-style [`push_response`](Self::push_response).
    #[must_use]
    pub fn with_response(mut self, provider: Arc<dyn ResponseHandlerProvider>) -> Self {
        self.push_response(provider);
        self
    }

    /// Request-handler providers in discovery order.
    pub fn request_providers(&self) -> impl Iterator<Item = &Arc<dyn RequestHandlerProvider>> {
        self.request.iter()
    }

    /// Response-handler providers in discovery order.
    pub fn response_providers(&self) -> impl Iterator<Item = &Arc<dyn ResponseHandlerProvider>> {
        self.response.iter()
    }

    /// Returns `true` when no providers are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.request.is_empty() && self.response.is_empty()
    }
}

/// Production discovery list.
///
/// Cookies run before session handling in both phases, so the session
/// response handler observes a store already updated by the cookie jar.
#[must_use]
pub fn standard_providers(
    session_store: Arc<dyn SessionStore>,
    cookie_handler: Arc<dyn CookieHandler>,
) -> HandlerProviders {
    HandlerProviders::new()
        .with_request(Arc::new(CookieRequestHandlerProvider::new(Arc::clone(
            &cookie_handler,
        ))))
        .with_request(Arc::new(ClientSessionRequestHandlerProvider::new(
            Arc::clone(&session_store),
        )))
        .with_response(Arc::new(CookieResponseHandlerProvider::new(cookie_handler)))
        .with_response(Arc::new(ClientSessionResponseHandlerProvider::new(
            session_store,
        )))
}

#[cfg(test)]
mod tests;
