//! In-flight exchange objects handed to handlers.
//!
//! Each `send` owns its own [`RequestExchange`] and [`ResponseExchange`]
//! end-to-end; nothing here is shared between concurrent calls.

use std::fmt;

use courier_config::ServerEndpoint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Encoded command body carried by an exchange.
pub type Body = Map<String, Value>;

/// Stage of an exchange a handler runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the network call.
    Request,
    /// After the reply arrived.
    Response,
}

impl Phase {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, multi-valued header list with case-insensitive names.
///
/// Serialised as a JSON array of `[name, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    /// Returns every value for `name` in insertion order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Adds a value, keeping existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces every value for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let key = name.into();
        self.remove(&key);
        self.entries.push((key, value.into()));
    }

    /// Removes every value for `name`.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// Iterates over all `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of header entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no headers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outgoing half of an exchange.
#[derive(Debug, Clone)]
pub struct RequestExchange {
    endpoint: ServerEndpoint,
    headers: Headers,
    body: Option<Body>,
}

impl RequestExchange {
    /// Creates an empty request addressed to `endpoint`.
    #[must_use]
    pub const fn new(endpoint: ServerEndpoint) -> Self {
        Self {
            endpoint,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Destination of the request.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable request headers.
    pub const fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Encoded command, once attached.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Attaches the encoded command.
    pub fn set_body(&mut self, body: Body) {
        self.body = Some(body);
    }

    /// Splits the exchange into headers and body for framing.
    #[must_use]
    pub fn into_parts(self) -> (Headers, Option<Body>) {
        (self.headers, self.body)
    }
}

/// Incoming half of an exchange.
#[derive(Debug, Clone)]
pub struct ResponseExchange {
    endpoint: ServerEndpoint,
    headers: Headers,
    body: Option<Body>,
}

impl ResponseExchange {
    /// Wraps a reply received from `endpoint`.
    #[must_use]
    pub const fn new(endpoint: ServerEndpoint, headers: Headers, body: Option<Body>) -> Self {
        Self {
            endpoint,
            headers,
            body,
        }
    }

    /// Peer that sent the reply.
    #[must_use]
    pub const fn endpoint(&self) -> &ServerEndpoint {
        &self.endpoint
    }

    /// Reply headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable reply headers.
    pub const fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Encoded reply command, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Takes the reply body out of the exchange.
    pub const fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}
