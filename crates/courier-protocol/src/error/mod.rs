//! Errors raised by the command codec.
//!
//! Codec failures always name the offending kind identifier (or the Rust
//! type, when no kind is registered for it) so a peer mismatch can be
//! diagnosed from the message alone.

use thiserror::Error;

/// Boxed error carried by transcoder faults.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures converting between commands and wire messages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No transcoder is registered for the command's runtime type.
    #[error("no transcoder registered for command type '{type_name}'")]
    UnregisteredCommand {
        /// Rust type name of the command value.
        type_name: &'static str,
    },

    /// The wire message names a kind with no registered transcoder.
    #[error("unknown command kind '{kind}'")]
    UnknownKind {
        /// Kind identifier read from the message.
        kind: String,
    },

    /// The reserved kind field is absent or not a string.
    #[error("wire message has no string '{field}' field")]
    MissingKind {
        /// Name of the reserved field.
        field: &'static str,
    },

    /// The payload is not a JSON object.
    #[error("wire message must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A reply arrived without a command body.
    #[error("response carried no command body")]
    MissingBody,

    /// A kind-specific field is absent or has the wrong JSON type.
    #[error("command '{kind}' field '{field}' must be {expected}")]
    InvalidField {
        /// Kind identifier of the command being decoded.
        kind: String,
        /// Offending field name.
        field: String,
        /// Description of the expected JSON type.
        expected: &'static str,
    },

    /// The registered transcoder was handed a command of another type.
    #[error("transcoder for '{kind}' cannot encode a value of type '{type_name}'")]
    TypeMismatch {
        /// Kind the transcoder is registered under.
        kind: String,
        /// Rust type name of the rejected value.
        type_name: &'static str,
    },

    /// A transcoder failed while encoding.
    #[error("failed to encode command '{kind}': {source}")]
    Encode {
        /// Kind identifier being encoded.
        kind: String,
        /// Underlying fault.
        #[source]
        source: BoxError,
    },

    /// A transcoder failed while decoding a recognised kind.
    #[error("failed to decode command '{kind}': {source}")]
    Decode {
        /// Kind identifier being decoded.
        kind: String,
        /// Underlying fault.
        #[source]
        source: BoxError,
    },
}

impl CodecError {
    /// Builds an [`CodecError::InvalidField`] error.
    #[must_use]
    pub fn invalid_field(kind: &str, field: &str, expected: &'static str) -> Self {
        Self::InvalidField {
            kind: kind.to_owned(),
            field: field.to_owned(),
            expected,
        }
    }

    /// Returns the kind identifier involved in the failure, when known.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::UnknownKind { kind }
            | Self::InvalidField { kind, .. }
            | Self::TypeMismatch { kind, .. }
            | Self::Encode { kind, .. }
            | Self::Decode { kind, .. } => Some(kind.as_str()),
            Self::UnregisteredCommand { .. }
            | Self::MissingKind { .. }
            | Self::NotAnObject { .. }
            | Self::MissingBody => None,
        }
    }
}

/// Failures while populating a [`TranscoderRegistry`](crate::TranscoderRegistry).
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The kind identifier was empty or whitespace.
    #[error("command kind identifier must not be blank")]
    BlankKind,

    /// Another transcoder already owns the kind identifier.
    #[error("command kind '{kind}' is already registered")]
    DuplicateKind {
        /// Conflicting kind identifier.
        kind: String,
    },

    /// The command type is already registered under another kind.
    #[error("command type '{type_name}' is already registered as '{existing}'")]
    DuplicateCommandType {
        /// Rust type name of the command.
        type_name: &'static str,
        /// Kind the type is already registered under.
        existing: String,
    },
}
