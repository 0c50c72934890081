//! Default values used when no configuration layer provides a setting.

use crate::endpoint::ServerEndpoint;
use crate::logging::LogFormat;

/// Default TCP host the client connects to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default TCP port the client connects to.
pub const DEFAULT_TCP_PORT: u16 = 9779;

/// Default time allowed for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default time allowed for a full request/response round trip.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the client session identifier.
pub const DEFAULT_SESSION_HEADER: &str = "x-courier-client-id";

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Endpoint used when none is configured.
#[must_use]
pub fn default_server_endpoint() -> ServerEndpoint {
    ServerEndpoint::tcp(DEFAULT_HOST, DEFAULT_TCP_PORT)
}

/// Connect timeout in seconds (serde default hook).
#[must_use]
pub const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Request timeout in seconds (serde default hook).
#[must_use]
pub const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Owned session header name used where allocation is required (e.g. serde).
#[must_use]
pub fn default_session_header() -> String {
    DEFAULT_SESSION_HEADER.to_owned()
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
