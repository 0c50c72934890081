//! Request/response handler pipeline for the courier transport client.
//!
//! Every exchange passes through an ordered [`HandlerChain`]: request
//! handlers run before the network call, response handlers after it. The
//! chain is how cross-cutting concerns such as session identity and cookies
//! are attached without the transport core knowing about them.
//!
//! Handlers are not registered by hand. Each concern ships a *provider*
//! ([`RequestHandlerProvider`] or [`ResponseHandlerProvider`]) that builds its
//! handler from the active [`Config`](courier_config::Config). At start-up
//! [`HandlerChain::discover`] walks an ordered [`HandlerProviders`] list and
//! registers the handlers in that order; a provider failure aborts start-up.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use courier_config::{Config, ServerEndpoint};
//! use courier_pipeline::{
//!     HandlerChain, InMemoryCookieStore, InMemorySessionStore, RequestExchange,
//!     standard_providers,
//! };
//!
//! let sessions = Arc::new(InMemorySessionStore::with_session_id("s-1"));
//! let cookies = Arc::new(InMemoryCookieStore::new());
//! let config = Config::default();
//! let chain = HandlerChain::discover(&config, &standard_providers(sessions, cookies))
//!     .expect("providers build");
//!
//! let mut exchange = RequestExchange::new(ServerEndpoint::tcp("127.0.0.1", 9779));
//! chain.apply_request_handlers(&mut exchange).expect("handlers succeed");
//! assert_eq!(exchange.headers().get(config.session_header()), Some("s-1"));
//! ```

pub mod chain;
pub mod cookie;
pub mod error;
pub mod exchange;
pub mod handler;
pub mod provider;
pub mod session;

pub use self::chain::HandlerChain;
pub use self::cookie::{
    COOKIE_HEADER, CookieHandler, CookieRequestHandler, CookieRequestHandlerProvider,
    CookieResponseHandler, CookieResponseHandlerProvider, InMemoryCookieStore, MalformedCookie,
    SET_COOKIE_HEADER,
};
pub use self::error::{ConfigError, HandlerError, HandlerFault, ProviderError};
pub use self::exchange::{Body, Headers, Phase, RequestExchange, ResponseExchange};
pub use self::handler::{RequestHandler, ResponseHandler};
pub use self::provider::{
    HandlerProviders, RequestHandlerProvider, ResponseHandlerProvider, standard_providers,
};
pub use self::session::{
    Adoption, ClientSessionRequestHandler, ClientSessionRequestHandlerProvider,
    ClientSessionResponseHandler, ClientSessionResponseHandlerProvider, InMemorySessionStore,
    SessionMismatch, SessionStore,
};
