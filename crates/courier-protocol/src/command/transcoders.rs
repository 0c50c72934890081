//! Transcoders for the built-in command kinds.
//!
//! Field keys are single letters to keep polling traffic small:
//! `n` name, `p` parent or params, `c` controller, `a` attribute, `v` value.

use serde_json::{Map, Value};

use super::{
    ActionParam, CallActionCommand, CreateContextCommand, CreateControllerCommand,
    DestroyContextCommand, DestroyControllerCommand, EmptyCommand, ValueChangedCommand,
};
use crate::error::CodecError;
use crate::registry::Transcoder;
use crate::wire::{self, WireMessage};

pub(crate) const CREATE_CONTEXT: &str = "CreateContext";
pub(crate) const DESTROY_CONTEXT: &str = "DestroyContext";
pub(crate) const CREATE_CONTROLLER: &str = "CreateController";
pub(crate) const DESTROY_CONTROLLER: &str = "DestroyController";
pub(crate) const CALL_ACTION: &str = "CallAction";
pub(crate) const VALUE_CHANGED: &str = "ValueChanged";
pub(crate) const EMPTY: &str = "EmptyCommand";

const NAME: &str = "n";
const PARENT: &str = "p";
const PARAMS: &str = "p";
const CONTROLLER: &str = "c";
const ATTRIBUTE: &str = "a";
const VALUE: &str = "v";

/// Generates a transcoder for a command without payload fields.
macro_rules! unit_transcoder {
    ($name:ident, $command:ident) => {
        #[derive(Debug, Default)]
        pub(crate) struct $name;

        impl Transcoder for $name {
            type Command = $command;

            fn encode(&self, _: &$command, _: &mut WireMessage) -> Result<(), CodecError> {
                Ok(())
            }

            fn decode(&self, _: &WireMessage) -> Result<$command, CodecError> {
                Ok($command)
            }
        }
    };
}

unit_transcoder!(CreateContextTranscoder, CreateContextCommand);
unit_transcoder!(DestroyContextTranscoder, DestroyContextCommand);
unit_transcoder!(EmptyTranscoder, EmptyCommand);

#[derive(Debug, Default)]
pub(crate) struct CreateControllerTranscoder;

impl Transcoder for CreateControllerTranscoder {
    type Command = CreateControllerCommand;

    fn encode(
        &self,
        command: &CreateControllerCommand,
        fields: &mut WireMessage,
    ) -> Result<(), CodecError> {
        fields.insert(NAME.to_owned(), Value::from(command.controller_name()));
        let parent = command
            .parent_controller_id()
            .map_or(Value::Null, Value::from);
        fields.insert(PARENT.to_owned(), parent);
        Ok(())
    }

    fn decode(&self, message: &WireMessage) -> Result<CreateControllerCommand, CodecError> {
        let name = wire::required_str(message, CREATE_CONTROLLER, NAME)?;
        let parent = wire::optional_str(message, CREATE_CONTROLLER, PARENT)?;
        Ok(CreateControllerCommand::new(name, parent.map(str::to_owned)))
    }
}

#[derive(Debug, Default)]
pub(crate) struct DestroyControllerTranscoder;

impl Transcoder for DestroyControllerTranscoder {
    type Command = DestroyControllerCommand;

    fn encode(
        &self,
        command: &DestroyControllerCommand,
        fields: &mut WireMessage,
    ) -> Result<(), CodecError> {
        fields.insert(CONTROLLER.to_owned(), Value::from(command.controller_id()));
        Ok(())
    }

    fn decode(&self, message: &WireMessage) -> Result<DestroyControllerCommand, CodecError> {
        let id = wire::required_str(message, DESTROY_CONTROLLER, CONTROLLER)?;
        Ok(DestroyControllerCommand::new(id))
    }
}

#[derive(Debug, Default)]
pub(crate) struct CallActionTranscoder;

impl Transcoder for CallActionTranscoder {
    type Command = CallActionCommand;

    fn encode(
        &self,
        command: &CallActionCommand,
        fields: &mut WireMessage,
    ) -> Result<(), CodecError> {
        fields.insert(CONTROLLER.to_owned(), Value::from(command.controller_id()));
        fields.insert(NAME.to_owned(), Value::from(command.action_name()));
        let params = command
            .params()
            .iter()
            .map(|param| {
                let mut entry = Map::new();
                entry.insert(NAME.to_owned(), Value::from(param.name()));
                entry.insert(VALUE.to_owned(), param.value().clone());
                Value::Object(entry)
            })
            .collect();
        fields.insert(PARAMS.to_owned(), Value::Array(params));
        Ok(())
    }

    fn decode(&self, message: &WireMessage) -> Result<CallActionCommand, CodecError> {
        let controller = wire::required_str(message, CALL_ACTION, CONTROLLER)?;
        let action = wire::required_str(message, CALL_ACTION, NAME)?;
        let params = wire::required_array(message, CALL_ACTION, PARAMS)?
            .iter()
            .map(decode_param)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CallActionCommand::new(controller, action, params))
    }
}

fn decode_param(value: &Value) -> Result<ActionParam, CodecError> {
    let entry = value
        .as_object()
        .ok_or_else(|| CodecError::invalid_field(CALL_ACTION, PARAMS, "array of objects"))?;
    let name = wire::required_str(entry, CALL_ACTION, NAME)?;
    let param_value = wire::required_value(entry, CALL_ACTION, VALUE)?;
    Ok(ActionParam::new(name, param_value.clone()))
}

#[derive(Debug, Default)]
pub(crate) struct ValueChangedTranscoder;

impl Transcoder for ValueChangedTranscoder {
    type Command = ValueChangedCommand;

    fn encode(
        &self,
        command: &ValueChangedCommand,
        fields: &mut WireMessage,
    ) -> Result<(), CodecError> {
        fields.insert(ATTRIBUTE.to_owned(), Value::from(command.attribute_id()));
        fields.insert(VALUE.to_owned(), command.new_value().clone());
        Ok(())
    }

    fn decode(&self, message: &WireMessage) -> Result<ValueChangedCommand, CodecError> {
        let attribute = wire::required_str(message, VALUE_CHANGED, ATTRIBUTE)?;
        let value = wire::required_value(message, VALUE_CHANGED, VALUE)?;
        Ok(ValueChangedCommand::new(attribute, value.clone()))
    }
}
