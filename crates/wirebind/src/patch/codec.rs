//! JSON codec for patch documents.
//!
//! A patch document is a JSON array of operation objects with exactly the
//! six RFC 6902 operation names. Paths are strict JSON Pointers.

use serde_json::{json, Value};
use wirebind_pointer::{format_pointer, parse_pointer};

use crate::patch::types::{Op, PatchError};

fn decode_path(obj: &serde_json::Map<String, Value>, key: &str) -> Result<Vec<String>, PatchError> {
    let raw = obj
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp(format!("missing or non-string `{key}`")))?;
    parse_pointer(raw).map_err(|e| PatchError::InvalidOp(e.to_string()))
}

fn required_value(obj: &serde_json::Map<String, Value>, op: &str) -> Result<Value, PatchError> {
    obj.get("value")
        .cloned()
        .ok_or_else(|| PatchError::InvalidOp(format!("`{op}` requires `value`")))
}

/// Deserialize one operation object.
pub fn from_json(v: &Value) -> Result<Op, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_name = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| PatchError::InvalidOp("missing `op` field".into()))?;
    let path = decode_path(obj, "path")?;

    match op_name {
        "add" => Ok(Op::Add {
            path,
            value: required_value(obj, "add")?,
        }),
        "remove" => Ok(Op::Remove { path }),
        "replace" => Ok(Op::Replace {
            path,
            value: required_value(obj, "replace")?,
        }),
        "move" => Ok(Op::Move {
            path,
            from: decode_path(obj, "from")?,
        }),
        "copy" => Ok(Op::Copy {
            path,
            from: decode_path(obj, "from")?,
        }),
        "test" => Ok(Op::Test {
            path,
            value: required_value(obj, "test")?,
        }),
        other => Err(PatchError::InvalidOp(format!("unknown op `{other}`"))),
    }
}

/// Serialize one operation back to its wire object.
pub fn to_json(op: &Op) -> Value {
    match op {
        Op::Add { path, value } => json!({
            "op": "add",
            "path": format_pointer(path),
            "value": value
        }),
        Op::Remove { path } => json!({
            "op": "remove",
            "path": format_pointer(path)
        }),
        Op::Replace { path, value } => json!({
            "op": "replace",
            "path": format_pointer(path),
            "value": value
        }),
        Op::Move { path, from } => json!({
            "op": "move",
            "path": format_pointer(path),
            "from": format_pointer(from)
        }),
        Op::Copy { path, from } => json!({
            "op": "copy",
            "path": format_pointer(path),
            "from": format_pointer(from)
        }),
        Op::Test { path, value } => json!({
            "op": "test",
            "path": format_pointer(path),
            "value": value
        }),
    }
}

/// Deserialize a full patch document.
pub fn from_json_patch(v: &Value) -> Result<Vec<Op>, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::MalformedPatch("patch document must be an array".into()))?;
    arr.iter().map(from_json).collect()
}

/// Serialize a full patch document.
pub fn to_json_patch(ops: &[Op]) -> Value {
    Value::Array(ops.iter().map(to_json).collect())
}
