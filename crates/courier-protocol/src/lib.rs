//! Command codec for the courier remoting substrate.
//!
//! Peers exchange a small vocabulary of typed commands. Each command kind is
//! identified on the wire by the reserved `id` field of a JSON object; every
//! other field is kind-specific. The [`TranscoderRegistry`] maps kinds to
//! [`Transcoder`] implementations and is the single place that guarantees the
//! `id` field is present and correct, so individual transcoders only deal
//! with their own payload fields.
//!
//! New command kinds are added by registration rather than by editing a
//! central dispatch table.
//!
//! # Example
//!
//! ```
//! use courier_protocol::{CreateControllerCommand, default_registry};
//!
//! let registry = default_registry().expect("built-in kinds register");
//! let command = CreateControllerCommand::new("Orders", None);
//! let message = registry.encode(&command).expect("encode");
//! assert_eq!(message["id"], "CreateController");
//!
//! let decoded = registry.decode(&message).expect("decode");
//! assert_eq!(decoded.downcast_ref::<CreateControllerCommand>(), Some(&command));
//! ```

pub mod command;
pub mod error;
pub mod registry;
pub mod wire;

#[cfg(test)]
mod tests;

pub use self::command::{
    ActionParam, CallActionCommand, Command, CreateContextCommand, CreateControllerCommand,
    DestroyContextCommand, DestroyControllerCommand, EmptyCommand, ValueChangedCommand,
};
pub use self::error::{BoxError, CodecError, RegistrationError};
pub use self::registry::{Deprecation, Transcoder, TranscoderRegistry, default_registry};
pub use self::wire::{KIND_FIELD, WireMessage};
