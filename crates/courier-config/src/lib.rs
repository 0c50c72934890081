//! Shared configuration for courier clients and servers.
//!
//! [`Config`] is loaded through `ortho_config`, which merges built-in
//! defaults, an optional configuration file, `COURIER_*` environment
//! variables, and command-line style arguments (later layers win).
//! Handler providers receive the loaded configuration during pipeline
//! discovery, so every cross-cutting concern reads its settings from the
//! same place.

mod defaults;
mod endpoint;
mod logging;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SESSION_HEADER, DEFAULT_TCP_PORT,
};
pub use endpoint::{EndpointParseError, ServerEndpoint};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the courier transport stack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "COURIER")]
pub struct Config {
    /// Address of the remote peer.
    #[serde(
        default = "defaults::default_server_endpoint",
        deserialize_with = "endpoint::deserialize_endpoint"
    )]
    pub server_endpoint: ServerEndpoint,
    /// Seconds allowed for establishing a connection. Must be non-zero.
    #[serde(default = "defaults::default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a full request/response round trip. Must be
    /// non-zero.
    #[serde(default = "defaults::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Header carrying the client session identifier.
    #[serde(default = "defaults::default_session_header")]
    pub session_header: String,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter")]
    pub log_filter: String,
    /// Output format for log records.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
}

impl Config {
    /// Address of the remote peer.
    #[must_use]
    pub const fn server_endpoint(&self) -> &ServerEndpoint {
        &self.server_endpoint
    }

    /// Connection establishment budget.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Round-trip budget for a single exchange.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Header carrying the client session identifier.
    #[must_use]
    pub fn session_header(&self) -> &str {
        self.session_header.as_str()
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format for log records.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_endpoint: defaults::default_server_endpoint(),
            connect_timeout_secs: defaults::default_connect_timeout_secs(),
            request_timeout_secs: defaults::default_request_timeout_secs(),
            session_header: defaults::default_session_header(),
            log_filter: defaults::default_log_filter(),
            log_format: defaults::default_log_format(),
        }
    }
}
