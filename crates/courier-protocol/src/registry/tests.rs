//! Unit tests for the transcoder registry.

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::command::{CreateContextCommand, EmptyCommand};
use crate::wire::WireMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Ping {
    seq: u64,
}

impl Command for Ping {}

#[derive(Debug)]
struct Unregistered;

impl Command for Unregistered {}

struct PingTranscoder;

impl Transcoder for PingTranscoder {
    type Command = Ping;

    fn encode(&self, command: &Ping, fields: &mut WireMessage) -> Result<(), CodecError> {
        fields.insert("seq".into(), Value::from(command.seq));
        Ok(())
    }

    fn decode(&self, message: &WireMessage) -> Result<Ping, CodecError> {
        let seq = message
            .get("seq")
            .and_then(Value::as_u64)
            .ok_or_else(|| CodecError::invalid_field("Ping", "seq", "unsigned integer"))?;
        Ok(Ping { seq })
    }
}

/// Writes a bogus kind field to prove the registry overrides it.
struct RogueTranscoder;

impl Transcoder for RogueTranscoder {
    type Command = Ping;

    fn encode(&self, command: &Ping, fields: &mut WireMessage) -> Result<(), CodecError> {
        fields.insert(KIND_FIELD.into(), Value::from("Wrong"));
        fields.insert("seq".into(), Value::from(command.seq));
        Ok(())
    }

    fn decode(&self, _message: &WireMessage) -> Result<Ping, CodecError> {
        Ok(Ping { seq: 0 })
    }
}

/// Fails mid-decode with a fault of its own.
struct FaultyDecoder;

impl Transcoder for FaultyDecoder {
    type Command = Ping;

    fn encode(&self, _command: &Ping, _fields: &mut WireMessage) -> Result<(), CodecError> {
        Ok(())
    }

    fn decode(&self, _message: &WireMessage) -> Result<Ping, CodecError> {
        Err(CodecError::Decode {
            kind: "Ping".into(),
            source: "sequence counter overflowed".into(),
        })
    }
}

fn object(value: Value) -> WireMessage {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[fixture]
fn ping_registry() -> TranscoderRegistry {
    let mut registry = TranscoderRegistry::new();
    registry
        .register("Ping", PingTranscoder)
        .expect("register ping");
    registry
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn new_registry_is_empty() {
    let registry = TranscoderRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[rstest]
fn register_rejects_duplicate_kind(mut ping_registry: TranscoderRegistry) {
    let error = ping_registry
        .register("Ping", RogueTranscoder)
        .expect_err("duplicate kind should fail");
    assert!(matches!(error, RegistrationError::DuplicateKind { ref kind } if kind == "Ping"));

    // The first registration stays active.
    let message = ping_registry.encode(&Ping { seq: 3 }).expect("encode");
    assert_eq!(Value::Object(message), json!({"id": "Ping", "seq": 3}));
}

#[rstest]
fn register_rejects_same_type_under_new_kind(mut ping_registry: TranscoderRegistry) {
    let error = ping_registry
        .register("PingV2", PingTranscoder)
        .expect_err("type already registered");
    assert!(matches!(
        error,
        RegistrationError::DuplicateCommandType { ref existing, .. } if existing == "Ping"
    ));
    assert!(!ping_registry.contains("PingV2"));
}

#[rstest]
#[case::empty("")]
#[case::whitespace("   ")]
fn register_rejects_blank_kind(#[case] kind: &str) {
    let mut registry = TranscoderRegistry::new();
    let error = registry
        .register(kind, PingTranscoder)
        .expect_err("blank kind");
    assert!(matches!(error, RegistrationError::BlankKind));
}

#[test]
fn deprecated_registration_is_flagged_but_functional() {
    let mut registry = TranscoderRegistry::new();
    registry
        .register_deprecated("Ping", PingTranscoder)
        .expect("register deprecated");

    assert_eq!(registry.deprecation("Ping"), Some(Deprecation::Deprecated));
    let message = registry.encode(&Ping { seq: 9 }).expect("encode");
    let decoded = registry.decode(&message).expect("decode");
    assert_eq!(decoded.downcast_ref::<Ping>(), Some(&Ping { seq: 9 }));
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

#[test]
fn kind_field_is_forced_to_registered_kind() {
    let mut registry = TranscoderRegistry::new();
    registry
        .register("Ping", RogueTranscoder)
        .expect("register rogue");

    let message = registry.encode(&Ping { seq: 1 }).expect("encode");

    assert_eq!(message.get(KIND_FIELD), Some(&Value::from("Ping")));
    assert_eq!(message.keys().next().map(String::as_str), Some(KIND_FIELD));
    assert_eq!(message.len(), 2);
}

#[rstest]
fn encode_unregistered_type_fails_fast(ping_registry: TranscoderRegistry) {
    let error = ping_registry
        .encode(&Unregistered)
        .expect_err("no transcoder");
    assert!(matches!(error, CodecError::UnregisteredCommand { type_name } if type_name.ends_with("Unregistered")));
}

#[rstest]
fn kind_of_resolves_runtime_type(ping_registry: TranscoderRegistry) {
    assert_eq!(ping_registry.kind_of(&Ping { seq: 0 }), Some("Ping"));
    assert_eq!(ping_registry.kind_of(&Unregistered), None);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[rstest]
fn decode_unknown_kind_fails(ping_registry: TranscoderRegistry) {
    let message = object(json!({"id": "DoesNotExist"}));
    let error = ping_registry.decode(&message).expect_err("unknown kind");
    assert!(matches!(error, CodecError::UnknownKind { ref kind } if kind == "DoesNotExist"));
}

#[rstest]
#[case::absent(json!({"seq": 1}))]
#[case::not_a_string(json!({"id": 7, "seq": 1}))]
fn decode_without_kind_fails(ping_registry: TranscoderRegistry, #[case] value: Value) {
    let error = ping_registry
        .decode(&object(value))
        .expect_err("kind field required");
    assert!(matches!(error, CodecError::MissingKind { field: "id" }));
}

#[rstest]
fn decode_value_rejects_non_objects(ping_registry: TranscoderRegistry) {
    let error = ping_registry
        .decode_value(&json!(["Ping"]))
        .expect_err("array is not a message");
    assert!(matches!(error, CodecError::NotAnObject { found: "array" }));
}

#[test]
fn decoder_fault_is_reported_with_kind_and_source() {
    let mut registry = TranscoderRegistry::new();
    registry
        .register("Ping", FaultyDecoder)
        .expect("register faulty");

    let error = registry
        .decode(&object(json!({"id": "Ping"})))
        .expect_err("decoder fails");

    assert_eq!(error.kind(), Some("Ping"));
    let source = std::error::Error::source(&error).expect("fault attached");
    assert!(source.to_string().contains("overflowed"));
}

#[rstest]
fn decode_ignores_unknown_extra_fields(ping_registry: TranscoderRegistry) {
    let message = object(json!({"id": "Ping", "seq": 2, "future": true}));
    let decoded = ping_registry.decode(&message).expect("decode");
    let reencoded = ping_registry.encode(decoded.as_ref()).expect("encode");
    assert_eq!(Value::Object(reencoded), json!({"id": "Ping", "seq": 2}));
}

// ---------------------------------------------------------------------------
// Built-in table
// ---------------------------------------------------------------------------

#[test]
fn default_registry_marks_empty_command_deprecated() {
    let registry = default_registry().expect("built-ins register");
    assert_eq!(registry.deprecation("EmptyCommand"), Some(Deprecation::Deprecated));
    assert_eq!(registry.deprecation("CreateContext"), Some(Deprecation::Active));
    assert_eq!(registry.kind_of(&EmptyCommand), Some("EmptyCommand"));
    assert_eq!(registry.kind_of(&CreateContextCommand), Some("CreateContext"));
}

#[test]
fn default_registry_lists_kinds_sorted() {
    let registry = default_registry().expect("built-ins register");
    assert_eq!(
        registry.kinds(),
        [
            "CallAction",
            "CreateContext",
            "CreateController",
            "DestroyContext",
            "DestroyController",
            "EmptyCommand",
            "ValueChanged",
        ]
    );
}
