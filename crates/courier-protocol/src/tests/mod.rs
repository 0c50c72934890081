//! Crate-level round-trip tests over the built-in command table.

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use crate::command::{
    ActionParam, CallActionCommand, Command, CreateContextCommand, CreateControllerCommand,
    DestroyContextCommand, DestroyControllerCommand, EmptyCommand, ValueChangedCommand,
};
use crate::registry::{TranscoderRegistry, default_registry};

#[fixture]
fn registry() -> TranscoderRegistry {
    default_registry().expect("built-ins register")
}

fn round_trip<C>(registry: &TranscoderRegistry, command: &C) -> C
where
    C: Command + Clone,
{
    let message = registry.encode(command).expect("encode");
    let decoded = registry.decode(&message).expect("decode");
    decoded
        .downcast::<C>()
        .map(|boxed| *boxed)
        .expect("decoded kind matches")
}

#[rstest]
fn empty_command_encodes_to_bare_kind(registry: TranscoderRegistry) {
    let message = registry.encode(&EmptyCommand).expect("encode");
    assert_eq!(Value::Object(message.clone()), json!({"id": "EmptyCommand"}));

    let decoded = registry.decode(&message).expect("decode");
    assert!(decoded.is::<EmptyCommand>());
}

#[rstest]
fn create_context_encodes_to_bare_kind(registry: TranscoderRegistry) {
    let message = registry.encode(&CreateContextCommand).expect("encode");
    assert_eq!(Value::Object(message), json!({"id": "CreateContext"}));
}

#[rstest]
fn unit_commands_round_trip(registry: TranscoderRegistry) {
    assert_eq!(round_trip(&registry, &CreateContextCommand), CreateContextCommand);
    assert_eq!(round_trip(&registry, &DestroyContextCommand), DestroyContextCommand);
    assert_eq!(round_trip(&registry, &EmptyCommand), EmptyCommand);
}

#[rstest]
#[case::root(CreateControllerCommand::new("Orders", None))]
#[case::nested(CreateControllerCommand::new("OrderLine", Some("c-1".into())))]
fn create_controller_round_trips(
    registry: TranscoderRegistry,
    #[case] command: CreateControllerCommand,
) {
    assert_eq!(round_trip(&registry, &command), command);
}

#[rstest]
fn destroy_controller_round_trips(registry: TranscoderRegistry) {
    let command = DestroyControllerCommand::new("c-9");
    assert_eq!(round_trip(&registry, &command), command);
}

#[rstest]
fn call_action_round_trips_with_nested_values(registry: TranscoderRegistry) {
    let command = CallActionCommand::new(
        "c-2",
        "submit",
        vec![
            ActionParam::new("count", json!(3)),
            ActionParam::new("tags", json!(["a", "b"])),
            ActionParam::new("meta", json!({"draft": false, "note": null})),
        ],
    );
    assert_eq!(round_trip(&registry, &command), command);
}

#[rstest]
#[case::text(json!("hello"))]
#[case::cleared(Value::Null)]
#[case::number(json!(4.5))]
fn value_changed_round_trips(registry: TranscoderRegistry, #[case] value: Value) {
    let command = ValueChangedCommand::new("attr-1", value);
    assert_eq!(round_trip(&registry, &command), command);
}

#[rstest]
fn kind_field_matches_registered_kind_for_every_builtin(registry: TranscoderRegistry) {
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(CreateContextCommand),
        Box::new(DestroyContextCommand),
        Box::new(EmptyCommand),
        Box::new(CreateControllerCommand::new("A", None)),
        Box::new(DestroyControllerCommand::new("c")),
        Box::new(CallActionCommand::new("c", "go", Vec::new())),
        Box::new(ValueChangedCommand::new("a", Value::Null)),
    ];

    for command in &commands {
        let expected = registry.kind_of(command.as_ref()).expect("registered");
        let message = registry.encode(command.as_ref()).expect("encode");
        assert_eq!(message.get("id"), Some(&Value::from(expected)));
    }
}
