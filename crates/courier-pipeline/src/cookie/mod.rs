//! Cookie propagation.
//!
//! The pipeline does not own a cookie jar. A [`CookieHandler`] collaborator
//! decides what to remember and what to send; the handlers here only move
//! `Cookie` and `Set-Cookie` headers between it and the exchange.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use courier_config::Config;
use thiserror::Error;

use crate::error::{HandlerFault, ProviderError};
use crate::exchange::{Headers, RequestExchange, ResponseExchange};
use crate::handler::{RequestHandler, ResponseHandler};
use crate::provider::{RequestHandlerProvider, ResponseHandlerProvider};

/// Request header carrying cookies.
pub const COOKIE_HEADER: &str = "cookie";

/// Response header setting a cookie.
pub const SET_COOKIE_HEADER: &str = "set-cookie";

/// Cookie jar capability consumed by the cookie handlers.
pub trait CookieHandler: Send + Sync {
    /// Writes stored cookies onto outgoing headers.
    ///
    /// # Errors
    ///
    /// Implementations may refuse when their storage is unavailable.
    fn attach_cookies(&self, headers: &mut Headers) -> Result<(), HandlerFault>;

    /// Records cookies set by a reply.
    ///
    /// # Errors
    ///
    /// Implementations may reject malformed `Set-Cookie` values.
    fn on_response_cookies(&self, headers: &Headers) -> Result<(), HandlerFault>;
}

/// A `Set-Cookie` value could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed set-cookie header '{header}'")]
pub struct MalformedCookie {
    header: String,
}

/// Change requested by a single `Set-Cookie` header.
#[derive(Debug, PartialEq, Eq)]
enum CookieUpdate {
    Store { name: String, value: String },
    Expire { name: String },
}

fn parse_set_cookie(header: &str) -> Result<CookieUpdate, MalformedCookie> {
    let malformed = || MalformedCookie {
        header: header.to_owned(),
    };
    let mut parts = header.split(';');
    let pair = parts.next().ok_or_else(malformed)?;
    let (raw_name, value) = pair.split_once('=').ok_or_else(malformed)?;
    let name = raw_name.trim();
    if name.is_empty() {
        return Err(malformed());
    }
    let expired = parts.any(|attribute| {
        attribute.split_once('=').is_some_and(|(key, val)| {
            key.trim().eq_ignore_ascii_case("max-age") && val.trim() == "0"
        })
    });
    if expired {
        Ok(CookieUpdate::Expire {
            name: name.to_owned(),
        })
    } else {
        Ok(CookieUpdate::Store {
            name: name.to_owned(),
            value: value.trim().to_owned(),
        })
    }
}

/// Cookie jar kept in process memory.
///
/// Every `Set-Cookie` header of a reply is parsed before the jar is touched,
/// so a malformed header leaves the jar unchanged.
#[derive(Debug, Default)]
pub struct InMemoryCookieStore {
    cookies: Mutex<BTreeMap<String, String>>,
}

impl InMemoryCookieStore {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Number of stored cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieHandler for InMemoryCookieStore {
    fn attach_cookies(&self, headers: &mut Headers) -> Result<(), HandlerFault> {
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        if cookies.is_empty() {
            return Ok(());
        }
        let line = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        headers.set(COOKIE_HEADER, line);
        Ok(())
    }

    fn on_response_cookies(&self, headers: &Headers) -> Result<(), HandlerFault> {
        let updates = headers
            .get_all(SET_COOKIE_HEADER)
            .map(parse_set_cookie)
            .collect::<Result<Vec<_>, _>>()?;
        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        for update in updates {
            match update {
                CookieUpdate::Store { name, value } => {
                    cookies.insert(name, value);
                }
                CookieUpdate::Expire { name } => {
                    cookies.remove(&name);
                }
            }
        }
        Ok(())
    }
}

/// Attaches stored cookies to outgoing requests.
pub struct CookieRequestHandler {
    jar: Arc<dyn CookieHandler>,
}

impl CookieRequestHandler {
    /// Creates a handler reading from `jar`.
    #[must_use]
    pub const fn new(jar: Arc<dyn CookieHandler>) -> Self {
        Self { jar }
    }
}

impl RequestHandler for CookieRequestHandler {
    fn handle_request(&self, exchange: &mut RequestExchange) -> Result<(), HandlerFault> {
        self.jar.attach_cookies(exchange.headers_mut())
    }

    fn name(&self) -> &str {
        "cookies"
    }
}

/// Records cookies set by replies.
pub struct CookieResponseHandler {
    jar: Arc<dyn CookieHandler>,
}

impl CookieResponseHandler {
    /// Creates a handler writing to `jar`.
    #[must_use]
    pub const fn new(jar: Arc<dyn CookieHandler>) -> Self {
        Self { jar }
    }
}

impl ResponseHandler for CookieResponseHandler {
    fn handle_response(&self, exchange: &mut ResponseExchange) -> Result<(), HandlerFault> {
        self.jar.on_response_cookies(exchange.headers())
    }

    fn name(&self) -> &str {
        "cookies"
    }
}

/// Provides [`CookieRequestHandler`].
pub struct CookieRequestHandlerProvider {
    jar: Arc<dyn CookieHandler>,
}

impl CookieRequestHandlerProvider {
    /// Creates a provider sharing `jar` with the handler it builds.
    #[must_use]
    pub const fn new(jar: Arc<dyn CookieHandler>) -> Self {
        Self { jar }
    }
}

impl RequestHandlerProvider for CookieRequestHandlerProvider {
    fn name(&self) -> &str {
        "cookies"
    }

    fn handler(&self, _config: &Config) -> Result<Arc<dyn RequestHandler>, ProviderError> {
        Ok(Arc::new(CookieRequestHandler::new(Arc::clone(&self.jar))))
    }
}

/// Provides [`CookieResponseHandler`].
pub struct CookieResponseHandlerProvider {
    jar: Arc<dyn CookieHandler>,
}

impl CookieResponseHandlerProvider {
    /// Creates a provider sharing `jar` with the handler it builds.
    #[must_use]
    pub const fn new(jar: Arc<dyn CookieHandler>) -> Self {
        Self { jar }
    }
}

impl ResponseHandlerProvider for CookieResponseHandlerProvider {
    fn name(&self) -> &str {
        "cookies"
    }

    fn handler(&self, _config: &Config) -> Result<Arc<dyn ResponseHandler>, ProviderError> {
        Ok(Arc::new(CookieResponseHandler::new(Arc::clone(&self.jar))))
    }
}
