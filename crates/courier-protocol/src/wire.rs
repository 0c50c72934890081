//! Untyped wire representation of commands.
//!
//! A [`WireMessage`] is an insertion-ordered JSON object. The reserved
//! [`KIND_FIELD`] holds the command kind identifier and is always written
//! first by the registry. The accessors here give transcoders uniform
//! [`CodecError::InvalidField`] reporting for missing or mistyped fields.

use serde_json::{Map, Value};

use crate::error::CodecError;

/// Reserved field naming the command kind.
pub const KIND_FIELD: &str = "id";

/// Ordered field mapping exchanged between peers.
pub type WireMessage = Map<String, Value>;

/// Reads a mandatory string field.
///
/// # Errors
///
/// Returns [`CodecError::InvalidField`] if the field is absent or not a string.
pub fn required_str<'a>(
    message: &'a WireMessage,
    kind: &str,
    field: &str,
) -> Result<&'a str, CodecError> {
    message
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::invalid_field(kind, field, "string"))
}

/// Reads a string field that may be absent or `null`.
///
/// # Errors
///
/// Returns [`CodecError::InvalidField`] if the field is present with a
/// non-string, non-null value.
pub fn optional_str<'a>(
    message: &'a WireMessage,
    kind: &str,
    field: &str,
) -> Result<Option<&'a str>, CodecError> {
    match message.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(CodecError::invalid_field(kind, field, "string or null")),
    }
}

/// Reads a mandatory field of any JSON type; `null` counts as present.
///
/// # Errors
///
/// Returns [`CodecError::InvalidField`] if the field is absent.
pub fn required_value<'a>(
    message: &'a WireMessage,
    kind: &str,
    field: &str,
) -> Result<&'a Value, CodecError> {
    message
        .get(field)
        .ok_or_else(|| CodecError::invalid_field(kind, field, "any value"))
}

/// Reads a mandatory array field.
///
/// # Errors
///
/// Returns [`CodecError::InvalidField`] if the field is absent or not an array.
pub fn required_array<'a>(
    message: &'a WireMessage,
    kind: &str,
    field: &str,
) -> Result<&'a [Value], CodecError> {
    message
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| CodecError::invalid_field(kind, field, "array"))
}
