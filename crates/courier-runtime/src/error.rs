//! Caller-bug errors.

use thiserror::Error;

/// A required argument was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("required argument '{argument}' was not supplied")]
pub struct PreconditionError {
    argument: &'static str,
}

impl PreconditionError {
    /// Reports the absent argument by name.
    #[must_use]
    pub const fn missing(argument: &'static str) -> Self {
        Self { argument }
    }

    /// Name of the absent argument.
    #[must_use]
    pub const fn argument(&self) -> &'static str {
        self.argument
    }
}
