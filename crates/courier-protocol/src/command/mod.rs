//! Command model.
//!
//! A command is an immutable value object. The set of kinds is open: any
//! `'static` type implementing [`Command`] can travel over the wire once a
//! [`Transcoder`](crate::Transcoder) for it is registered. The kind
//! identifier is attached by the registry, not by the type itself.

pub(crate) mod transcoders;

use std::any::Any;
use std::fmt;

use serde_json::Value;

pub(crate) use self::transcoders::{
    CallActionTranscoder, CreateContextTranscoder, CreateControllerTranscoder,
    DestroyContextTranscoder, DestroyControllerTranscoder, EmptyTranscoder,
    ValueChangedTranscoder,
};

/// A typed message exchanged between peers.
pub trait Command: Any + fmt::Debug + Send + Sync {
    /// Rust type name used in diagnostics for unregistered commands.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Command {
    /// Returns `true` when the command is a `C`.
    #[must_use]
    pub fn is<C: Command>(&self) -> bool {
        (self as &dyn Any).is::<C>()
    }

    /// Borrows the command as a `C`, if it is one.
    #[must_use]
    pub fn downcast_ref<C: Command>(&self) -> Option<&C> {
        (self as &dyn Any).downcast_ref::<C>()
    }

    /// Converts a boxed command into a `C`, if it is one.
    #[must_use]
    pub fn downcast<C: Command>(self: Box<Self>) -> Option<Box<C>> {
        let any: Box<dyn Any> = self;
        any.downcast::<C>().ok()
    }
}

/// Asks the server to create a client context (session).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateContextCommand;

impl Command for CreateContextCommand {}

/// Asks the server to tear down the client context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyContextCommand;

impl Command for DestroyContextCommand {}

/// No-op command kept for peers that still poll with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyCommand;

impl Command for EmptyCommand {}

/// Creates a named controller, optionally nested under a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateControllerCommand {
    controller_name: String,
    parent_controller_id: Option<String>,
}

impl CreateControllerCommand {
    /// Creates the command.
    #[must_use]
    pub fn new(controller_name: impl Into<String>, parent_controller_id: Option<String>) -> Self {
        Self {
            controller_name: controller_name.into(),
            parent_controller_id,
        }
    }

    /// Name of the controller type to instantiate.
    #[must_use]
    pub fn controller_name(&self) -> &str {
        &self.controller_name
    }

    /// Identifier of the parent controller, if any.
    #[must_use]
    pub fn parent_controller_id(&self) -> Option<&str> {
        self.parent_controller_id.as_deref()
    }
}

impl Command for CreateControllerCommand {}

/// Destroys a controller instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyControllerCommand {
    controller_id: String,
}

impl DestroyControllerCommand {
    /// Creates the command.
    #[must_use]
    pub fn new(controller_id: impl Into<String>) -> Self {
        Self {
            controller_id: controller_id.into(),
        }
    }

    /// Identifier of the controller to destroy.
    #[must_use]
    pub fn controller_id(&self) -> &str {
        &self.controller_id
    }
}

impl Command for DestroyControllerCommand {}

/// Named argument passed to a controller action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionParam {
    name: String,
    value: Value,
}

impl ActionParam {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

/// Invokes an action on a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct CallActionCommand {
    controller_id: String,
    action_name: String,
    params: Vec<ActionParam>,
}

impl CallActionCommand {
    /// Creates the command; parameter order is preserved on the wire.
    #[must_use]
    pub fn new(
        controller_id: impl Into<String>,
        action_name: impl Into<String>,
        params: Vec<ActionParam>,
    ) -> Self {
        Self {
            controller_id: controller_id.into(),
            action_name: action_name.into(),
            params,
        }
    }

    /// Target controller.
    #[must_use]
    pub fn controller_id(&self) -> &str {
        &self.controller_id
    }

    /// Action to invoke.
    #[must_use]
    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    /// Ordered action parameters.
    #[must_use]
    pub fn params(&self) -> &[ActionParam] {
        &self.params
    }
}

impl Command for CallActionCommand {}

/// Reports a new value for a model attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChangedCommand {
    attribute_id: String,
    new_value: Value,
}

impl ValueChangedCommand {
    /// Creates the command. `Value::Null` clears the attribute.
    #[must_use]
    pub fn new(attribute_id: impl Into<String>, new_value: Value) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            new_value,
        }
    }

    /// Attribute whose value changed.
    #[must_use]
    pub fn attribute_id(&self) -> &str {
        &self.attribute_id
    }

    /// The new value.
    #[must_use]
    pub const fn new_value(&self) -> &Value {
        &self.new_value
    }
}

impl Command for ValueChangedCommand {}

#[cfg(test)]
mod tests;
