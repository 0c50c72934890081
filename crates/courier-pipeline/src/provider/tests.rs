//! Unit tests for provider lists and the production wiring.

use courier_config::ServerEndpoint;

use super::*;
use crate::chain::HandlerChain;
use crate::cookie::InMemoryCookieStore;
use crate::exchange::{Headers, RequestExchange, ResponseExchange};
use crate::session::InMemorySessionStore;

fn endpoint() -> ServerEndpoint {
    ServerEndpoint::tcp("127.0.0.1", 9779)
}

#[test]
fn new_list_is_empty() {
    assert!(HandlerProviders::new().is_empty());
}

#[test]
fn standard_providers_order_cookies_before_sessions() {
    let providers = standard_providers(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(InMemoryCookieStore::new()),
    );

    let request: Vec<_> = providers.request_providers().map(|p| p.name()).collect();
    let response: Vec<_> = providers.response_providers().map(|p| p.name()).collect();
    assert_eq!(request, ["cookies", "client-session"]);
    assert_eq!(response, ["cookies", "client-session"]);
}

#[test]
fn standard_chain_round_trips_session_and_cookies() {
    let sessions = Arc::new(InMemorySessionStore::new());
    let cookies = Arc::new(InMemoryCookieStore::new());
    let config = Config::default();
    let chain = HandlerChain::discover(
        &config,
        &standard_providers(sessions.clone(), cookies.clone()),
    )
    .expect("standard providers build");

    let mut first = RequestExchange::new(endpoint());
    chain
        .apply_request_handlers(&mut first)
        .expect("first request");
    assert!(first.headers().is_empty());

    let mut reply_headers = Headers::new();
    reply_headers.append(config.session_header(), "s-42");
    reply_headers.append("Set-Cookie", "route=a; Path=/");
    chain
        .apply_response_handlers(&mut ResponseExchange::new(endpoint(), reply_headers, None))
        .expect("reply");

    let mut second = RequestExchange::new(endpoint());
    chain
        .apply_request_handlers(&mut second)
        .expect("second request");
    assert_eq!(second.headers().get(config.session_header()), Some("s-42"));
    assert_eq!(second.headers().get("cookie"), Some("route=a"));
    assert_eq!(sessions.current_session_id().as_deref(), Some("s-42"));
    assert_eq!(cookies.get("route").as_deref(), Some("a"));
}

#[test]
fn blank_session_header_aborts_discovery() {
    let config = Config {
        session_header: String::new(),
        ..Config::default()
    };
    let providers = standard_providers(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(InMemoryCookieStore::new()),
    );

    let error = HandlerChain::discover(&config, &providers).expect_err("discovery fails");
    assert!(error.to_string().contains("client-session"));
}
