//! Errors raised while building or running the handler pipeline.

use thiserror::Error;

use crate::exchange::Phase;

/// Fault raised by an individual handler.
pub type HandlerFault = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A handler in the chain failed; the rest of the chain was skipped.
#[derive(Debug, Error)]
#[error("{phase} handler #{position} ('{handler}') failed: {source}")]
pub struct HandlerError {
    phase: Phase,
    position: usize,
    handler: String,
    #[source]
    source: HandlerFault,
}

impl HandlerError {
    /// Wraps a handler fault with its chain coordinates.
    #[must_use]
    pub fn new(
        phase: Phase,
        position: usize,
        handler: impl Into<String>,
        source: HandlerFault,
    ) -> Self {
        Self {
            phase,
            position,
            handler: handler.into(),
            source,
        }
    }

    /// Phase the failing handler belongs to.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Zero-based position of the failing handler within its phase.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Diagnostic name of the failing handler.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// The handler's own fault.
    #[must_use]
    pub fn fault(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.source.as_ref()
    }
}

/// A provider could not construct its handler.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
    #[source]
    source: Option<HandlerFault>,
}

impl ProviderError {
    /// Creates an error with a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying fault.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: HandlerFault) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Start-up failures of the pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A handler provider failed; the pipeline must not start half-built.
    #[error("{phase} handler provider '{provider}' (#{position}) failed: {source}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Phase the provider contributes to.
        phase: Phase,
        /// Zero-based position in discovery order.
        position: usize,
        /// Provider's error.
        #[source]
        source: ProviderError,
    },
    /// A setting holds a value the client cannot run with.
    #[error("setting '{setting}' is invalid: {reason}")]
    InvalidSetting {
        /// Configuration key.
        setting: &'static str,
        /// What is wrong with the value.
        reason: &'static str,
    },
}
