//! Transcoder registry keyed by command kind.
//!
//! The [`TranscoderRegistry`] stores one transcoder per kind identifier and
//! also indexes kinds by the Rust type they encode, so `encode` can find the
//! transcoder from the command value alone. Duplicate kinds and duplicate
//! command types are rejected; the first registration stays active.
//!
//! Registration takes `&mut self`. Once the registry is shared (for example
//! behind an `Arc` inside a transport client) it is read-only, so lookups
//! never observe a partially inserted entry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::command::{
    CallActionTranscoder, Command, CreateContextTranscoder, CreateControllerTranscoder,
    DestroyContextTranscoder, DestroyControllerTranscoder, EmptyTranscoder,
    ValueChangedTranscoder,
};
use crate::error::{CodecError, RegistrationError};
use crate::wire::{KIND_FIELD, WireMessage};

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = "courier_protocol::registry";

/// Encoder/decoder pair for exactly one command type.
///
/// Implementations fill and read kind-specific fields only. The registry
/// writes the reserved kind field itself and discards any value a
/// transcoder puts there.
///
/// # Example
///
/// ```
/// use courier_protocol::{Command, CodecError, Transcoder, TranscoderRegistry, WireMessage};
///
/// #[derive(Debug, PartialEq)]
/// struct Ping(u64);
/// impl Command for Ping {}
///
/// struct PingTranscoder;
/// impl Transcoder for PingTranscoder {
///     type Command = Ping;
///
///     fn encode(&self, command: &Ping, fields: &mut WireMessage) -> Result<(), CodecError> {
///         fields.insert("seq".into(), command.0.into());
///         Ok(())
///     }
///
///     fn decode(&self, message: &WireMessage) -> Result<Ping, CodecError> {
///         message
///             .get("seq")
///             .and_then(|value| value.as_u64())
///             .map(Ping)
///             .ok_or_else(|| CodecError::invalid_field("Ping", "seq", "unsigned integer"))
///     }
/// }
///
/// let mut registry = TranscoderRegistry::new();
/// registry.register("Ping", PingTranscoder).unwrap();
/// let message = registry.encode(&Ping(4)).unwrap();
/// assert_eq!(message["id"], "Ping");
/// ```
pub trait Transcoder: Send + Sync + 'static {
    /// Command type this transcoder handles.
    type Command: Command;

    /// Writes the kind-specific fields of `command` into `fields`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the command cannot be represented.
    fn encode(&self, command: &Self::Command, fields: &mut WireMessage) -> Result<(), CodecError>;

    /// Rebuilds a command from a wire message whose kind already matched.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if a required field is missing or malformed.
    fn decode(&self, message: &WireMessage) -> Result<Self::Command, CodecError>;
}

/// Lifecycle status of a registered kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Deprecation {
    /// Kind is current.
    #[default]
    Active,
    /// Kind still works but is being phased out.
    Deprecated,
}

/// Object-safe view over a [`Transcoder`].
trait ErasedTranscoder: Send + Sync {
    fn encode_dyn(&self, kind: &str, command: &dyn Command, fields: &mut WireMessage)
    -> Result<(), CodecError>;

    fn decode_dyn(&self, message: &WireMessage) -> Result<Box<dyn Command>, CodecError>;
}

impl<T: Transcoder> ErasedTranscoder for T {
    fn encode_dyn(
        &self,
        kind: &str,
        command: &dyn Command,
        fields: &mut WireMessage,
    ) -> Result<(), CodecError> {
        let typed = command
            .downcast_ref::<T::Command>()
            .ok_or_else(|| CodecError::TypeMismatch {
                kind: kind.to_owned(),
                type_name: command.type_name(),
            })?;
        self.encode(typed, fields)
    }

    fn decode_dyn(&self, message: &WireMessage) -> Result<Box<dyn Command>, CodecError> {
        let command = self.decode(message)?;
        Ok(Box::new(command))
    }
}

struct Registration {
    transcoder: Box<dyn ErasedTranscoder>,
    type_name: &'static str,
    deprecation: Deprecation,
}

/// Registry of transcoders keyed by kind identifier.
#[derive(Default)]
pub struct TranscoderRegistry {
    entries: HashMap<String, Registration>,
    kinds_by_type: HashMap<TypeId, String>,
}

impl fmt::Debug for TranscoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscoderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl TranscoderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transcoder` under `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if the kind is blank, already taken, or
    /// if the command type is already registered under another kind.
    pub fn register<T: Transcoder>(
        &mut self,
        kind: impl Into<String>,
        transcoder: T,
    ) -> Result<(), RegistrationError> {
        self.insert(kind.into(), transcoder, Deprecation::Active)
    }

    /// Registers a transcoder for a kind that is being phased out.
    ///
    /// Behaviour is identical to [`register`](Self::register); a warning is
    /// logged so remaining users of the kind can be found.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_deprecated<T: Transcoder>(
        &mut self,
        kind: impl Into<String>,
        transcoder: T,
    ) -> Result<(), RegistrationError> {
        self.insert(kind.into(), transcoder, Deprecation::Deprecated)
    }

    fn insert<T: Transcoder>(
        &mut self,
        kind: String,
        transcoder: T,
        deprecation: Deprecation,
    ) -> Result<(), RegistrationError> {
        if kind.trim().is_empty() {
            return Err(RegistrationError::BlankKind);
        }
        if self.entries.contains_key(&kind) {
            return Err(RegistrationError::DuplicateKind { kind });
        }
        let type_id = TypeId::of::<T::Command>();
        let type_name = std::any::type_name::<T::Command>();
        if let Some(existing) = self.kinds_by_type.get(&type_id) {
            return Err(RegistrationError::DuplicateCommandType {
                type_name,
                existing: existing.clone(),
            });
        }

        match deprecation {
            Deprecation::Deprecated => warn!(
                target: REGISTRY_TARGET,
                kind = kind.as_str(),
                command_type = type_name,
                "registered deprecated command kind"
            ),
            Deprecation::Active => debug!(
                target: REGISTRY_TARGET,
                kind = kind.as_str(),
                command_type = type_name,
                "registered command kind"
            ),
        }

        self.kinds_by_type.insert(type_id, kind.clone());
        self.entries.insert(
            kind,
            Registration {
                transcoder: Box::new(transcoder),
                type_name,
                deprecation,
            },
        );
        Ok(())
    }

    /// Encodes a command into a wire message.
    ///
    /// The returned message always starts with the reserved kind field set to
    /// the registered kind, whatever the transcoder wrote.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnregisteredCommand`] when no transcoder handles
    /// the command's type, or any error raised by the transcoder.
    pub fn encode(&self, command: &dyn Command) -> Result<WireMessage, CodecError> {
        let kind = self
            .kind_of(command)
            .ok_or_else(|| CodecError::UnregisteredCommand {
                type_name: command.type_name(),
            })?;
        let registration = self
            .entries
            .get(kind)
            .ok_or_else(|| CodecError::UnknownKind {
                kind: kind.to_owned(),
            })?;

        let mut fields = WireMessage::new();
        registration
            .transcoder
            .encode_dyn(kind, command, &mut fields)?;

        let mut message = WireMessage::with_capacity(fields.len() + 1);
        message.insert(KIND_FIELD.to_owned(), Value::from(kind));
        message.extend(fields.into_iter().filter(|(key, _)| key != KIND_FIELD));
        Ok(message)
    }

    /// Decodes a wire message into a command.
    ///
    /// Extra fields the kind does not define are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingKind`] if the reserved field is absent or
    /// not a string, [`CodecError::UnknownKind`] if no transcoder is
    /// registered for it, or any error raised by the transcoder.
    pub fn decode(&self, message: &WireMessage) -> Result<Box<dyn Command>, CodecError> {
        let kind = message
            .get(KIND_FIELD)
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingKind { field: KIND_FIELD })?;
        let registration = self
            .entries
            .get(kind)
            .ok_or_else(|| CodecError::UnknownKind {
                kind: kind.to_owned(),
            })?;
        registration.transcoder.decode_dyn(message)
    }

    /// Decodes an arbitrary JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotAnObject`] for non-object values, otherwise
    /// the same errors as [`decode`](Self::decode).
    pub fn decode_value(&self, value: &Value) -> Result<Box<dyn Command>, CodecError> {
        match value {
            Value::Object(message) => self.decode(message),
            other => Err(CodecError::NotAnObject {
                found: json_type_name(other),
            }),
        }
    }

    /// Returns the kind registered for the command's runtime type.
    #[must_use]
    pub fn kind_of(&self, command: &dyn Command) -> Option<&str> {
        let type_id = (command as &dyn Any).type_id();
        self.kinds_by_type.get(&type_id).map(String::as_str)
    }

    /// Returns `true` when `kind` has a transcoder.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Returns the deprecation status of `kind`, if registered.
    #[must_use]
    pub fn deprecation(&self, kind: &str) -> Option<Deprecation> {
        self.entries.get(kind).map(|entry| entry.deprecation)
    }

    /// Returns the Rust type registered under `kind`.
    #[must_use]
    pub fn command_type(&self, kind: &str) -> Option<&'static str> {
        self.entries.get(kind).map(|entry| entry.type_name)
    }

    /// Registered kinds in lexical order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a registry holding every built-in command kind.
///
/// `EmptyCommand` is registered as deprecated.
///
/// # Errors
///
/// Returns [`RegistrationError`] only if the built-in table is inconsistent.
pub fn default_registry() -> Result<TranscoderRegistry, RegistrationError> {
    use crate::command::transcoders as kinds;

    let mut registry = TranscoderRegistry::new();
    registry.register(kinds::CREATE_CONTEXT, CreateContextTranscoder)?;
    registry.register(kinds::DESTROY_CONTEXT, DestroyContextTranscoder)?;
    registry.register(kinds::CREATE_CONTROLLER, CreateControllerTranscoder)?;
    registry.register(kinds::DESTROY_CONTROLLER, DestroyControllerTranscoder)?;
    registry.register(kinds::CALL_ACTION, CallActionTranscoder)?;
    registry.register(kinds::VALUE_CHANGED, ValueChangedTranscoder)?;
    registry.register_deprecated(kinds::EMPTY, EmptyTranscoder)?;
    Ok(registry)
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests;
