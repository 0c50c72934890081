//! Unit tests for the built-in command types and their transcoders.

use serde_json::{Value, json};

use super::*;
use crate::error::CodecError;
use crate::registry::Transcoder;
use crate::wire::WireMessage;

fn object(value: Value) -> WireMessage {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn downcast_ref_matches_concrete_type() {
    let command: Box<dyn Command> = Box::new(DestroyControllerCommand::new("c-1"));
    assert!(command.is::<DestroyControllerCommand>());
    assert!(!command.is::<CreateContextCommand>());
    assert_eq!(
        command
            .downcast_ref::<DestroyControllerCommand>()
            .map(DestroyControllerCommand::controller_id),
        Some("c-1")
    );
}

#[test]
fn boxed_downcast_returns_owned_value() {
    let command: Box<dyn Command> = Box::new(ValueChangedCommand::new("a-1", json!(3)));
    let typed = command
        .downcast::<ValueChangedCommand>()
        .expect("type matches");
    assert_eq!(typed.new_value(), &json!(3));
}

#[test]
fn type_name_reports_concrete_type() {
    let command: &dyn Command = &EmptyCommand;
    assert!(command.type_name().ends_with("EmptyCommand"));
}

#[test]
fn create_controller_writes_null_parent() {
    let mut fields = WireMessage::new();
    CreateControllerTranscoder
        .encode(&CreateControllerCommand::new("Orders", None), &mut fields)
        .expect("encode");
    assert_eq!(Value::Object(fields), json!({"n": "Orders", "p": null}));
}

#[test]
fn call_action_preserves_parameter_order() {
    let command = CallActionCommand::new(
        "c-7",
        "save",
        vec![
            ActionParam::new("z", json!(1)),
            ActionParam::new("a", json!("two")),
        ],
    );
    let mut fields = WireMessage::new();
    CallActionTranscoder
        .encode(&command, &mut fields)
        .expect("encode");

    let names: Vec<&str> = fields["p"]
        .as_array()
        .expect("params array")
        .iter()
        .filter_map(|param| param["n"].as_str())
        .collect();
    assert_eq!(names, ["z", "a"]);
}

#[test]
fn call_action_rejects_non_object_params() {
    let message = object(json!({"c": "c-1", "n": "save", "p": [1, 2]}));
    let error = CallActionTranscoder
        .decode(&message)
        .expect_err("params must be objects");
    assert!(matches!(error, CodecError::InvalidField { ref field, .. } if field == "p"));
}

#[test]
fn call_action_param_without_value_is_rejected() {
    let message = object(json!({"c": "c-1", "n": "save", "p": [{"n": "flag"}]}));
    let error = CallActionTranscoder
        .decode(&message)
        .expect_err("parameter value is required");
    assert!(matches!(
        error,
        CodecError::InvalidField { ref kind, ref field, .. } if kind == "CallAction" && field == "v"
    ));
}

#[test]
fn call_action_param_with_null_value_decodes() {
    let message = object(json!({"c": "c-1", "n": "save", "p": [{"n": "flag", "v": null}]}));
    let command = CallActionTranscoder.decode(&message).expect("decode");
    assert_eq!(command.params().first().map(ActionParam::value), Some(&Value::Null));
}

#[test]
fn value_changed_requires_value_field() {
    let message = object(json!({"a": "attr-1"}));
    let error = ValueChangedTranscoder
        .decode(&message)
        .expect_err("value is required");
    assert!(matches!(error, CodecError::InvalidField { ref field, .. } if field == "v"));
}

#[test]
fn destroy_controller_requires_string_id() {
    let message = object(json!({"c": 42}));
    let error = DestroyControllerTranscoder
        .decode(&message)
        .expect_err("id must be a string");
    assert_eq!(error.kind(), Some("DestroyController"));
}
