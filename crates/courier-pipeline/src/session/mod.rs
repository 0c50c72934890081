//! Client session propagation.
//!
//! The request handler stamps the current session id onto every outgoing
//! exchange; the response handler adopts the id the server assigns. The id
//! lives in a [`SessionStore`] owned by the caller.

use std::sync::{Arc, PoisonError, RwLock};

use courier_config::Config;
use thiserror::Error;
use tracing::debug;

use crate::error::{HandlerFault, ProviderError};
use crate::exchange::{RequestExchange, ResponseExchange};
use crate::handler::{RequestHandler, ResponseHandler};
use crate::provider::{RequestHandlerProvider, ResponseHandlerProvider};

const SESSION_TARGET: &str = "courier_pipeline::session";

/// Holds the identity of the current client session.
pub trait SessionStore: Send + Sync {
    /// Current session id, if one has been established.
    fn current_session_id(&self) -> Option<String>;

    /// Records `id` unconditionally, replacing any held session.
    fn set_session_id(&self, id: &str);

    /// Records `id` only when no session is held yet.
    ///
    /// The check and the write are one step, so concurrent replies carrying
    /// different ids cannot both be adopted.
    fn adopt_session_id(&self, id: &str) -> Adoption;
}

/// Outcome of [`SessionStore::adopt_session_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adoption {
    /// No session was held; `id` is now current.
    Established,
    /// `id` was already current.
    Unchanged,
    /// Another session is current; it is returned and left in place.
    Conflict(String),
}

/// Session store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    id: RwLock<Option<String>>,
}

impl InMemorySessionStore {
    /// Creates a store with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `id`.
    #[must_use]
    pub fn with_session_id(id: impl Into<String>) -> Self {
        Self {
            id: RwLock::new(Some(id.into())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn current_session_id(&self) -> Option<String> {
        self.id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_session_id(&self, id: &str) {
        *self.id.write().unwrap_or_else(PoisonError::into_inner) = Some(id.to_owned());
    }

    fn adopt_session_id(&self, id: &str) -> Adoption {
        let mut held = self.id.write().unwrap_or_else(PoisonError::into_inner);
        match held.as_deref() {
            Some(current) if current == id => Adoption::Unchanged,
            Some(current) => Adoption::Conflict(current.to_owned()),
            None => {
                *held = Some(id.to_owned());
                Adoption::Established
            }
        }
    }
}

/// The server answered with a session id other than the one in use.
#[derive(Debug, Error)]
#[error("server assigned session '{received}' but '{current}' is already in use")]
pub struct SessionMismatch {
    current: String,
    received: String,
}

/// Adds the session header when a session is known.
pub struct ClientSessionRequestHandler {
    header: String,
    store: Arc<dyn SessionStore>,
}

impl ClientSessionRequestHandler {
    /// Creates a handler writing `header` from `store`.
    #[must_use]
    pub fn new(header: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            header: header.into(),
            store,
        }
    }
}

impl RequestHandler for ClientSessionRequestHandler {
    fn handle_request(&self, exchange: &mut RequestExchange) -> Result<(), HandlerFault> {
        if let Some(id) = self.store.current_session_id() {
            exchange.headers_mut().set(self.header.as_str(), id);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "client-session"
    }
}

/// Adopts the session id returned by the server.
pub struct ClientSessionResponseHandler {
    header: String,
    store: Arc<dyn SessionStore>,
}

impl ClientSessionResponseHandler {
    /// Creates a handler reading `header` into `store`.
    #[must_use]
    pub fn new(header: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            header: header.into(),
            store,
        }
    }
}

impl ResponseHandler for ClientSessionResponseHandler {
    fn handle_response(&self, exchange: &mut ResponseExchange) -> Result<(), HandlerFault> {
        let Some(received) = exchange.headers().get(&self.header) else {
            return Ok(());
        };
        match self.store.adopt_session_id(received) {
            Adoption::Established => {
                debug!(target: SESSION_TARGET, session = received, "session established");
                Ok(())
            }
            Adoption::Unchanged => Ok(()),
            Adoption::Conflict(current) => Err(Box::new(SessionMismatch {
                current,
                received: received.to_owned(),
            })),
        }
    }

    fn name(&self) -> &str {
        "client-session"
    }
}

fn session_header(config: &Config) -> Result<&str, ProviderError> {
    let header = config.session_header().trim();
    if header.is_empty() {
        return Err(ProviderError::new("session header name must not be blank"));
    }
    Ok(header)
}

/// Provides [`ClientSessionRequestHandler`].
pub struct ClientSessionRequestHandlerProvider {
    store: Arc<dyn SessionStore>,
}

impl ClientSessionRequestHandlerProvider {
    /// Creates a provider sharing `store` with the handler it builds.
    #[must_use]
    pub const fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl RequestHandlerProvider for ClientSessionRequestHandlerProvider {
    fn name(&self) -> &str {
        "client-session"
    }

    fn handler(&self, config: &Config) -> Result<Arc<dyn RequestHandler>, ProviderError> {
        let header = session_header(config)?;
        Ok(Arc::new(ClientSessionRequestHandler::new(
            header,
            Arc::clone(&self.store),
        )))
    }
}

/// Provides [`ClientSessionResponseHandler`].
pub struct ClientSessionResponseHandlerProvider {
    store: Arc<dyn SessionStore>,
}

impl ClientSessionResponseHandlerProvider {
    /// Creates a provider sharing `store` with the handler it builds.
    #[must_use]
    pub const fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl ResponseHandlerProvider for ClientSessionResponseHandlerProvider {
    fn name(&self) -> &str {
        "client-session"
    }

    fn handler(&self, config: &Config) -> Result<Arc<dyn ResponseHandler>, ProviderError> {
        let header = session_header(config)?;
        Ok(Arc::new(ClientSessionResponseHandler::new(
            header,
            Arc::clone(&self.store),
        )))
    }
}
