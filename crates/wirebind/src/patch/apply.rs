//! Patch application state machine.
//!
//! Operations apply strictly in order, each against the result of the
//! previous one. The first failure aborts the run; nothing is rolled
//! back, so callers hand in a document they are willing to discard.

use serde_json::Value;
use wirebind_pointer::{format_pointer, get, get_mut, is_strict_prefix, is_valid_index, Path,
    APPEND_MARKER};

use crate::patch::types::{Op, PatchError};

/// Apply one operation to the document, mutating it in place.
pub fn apply_op(doc: &mut Value, op: &Op) -> Result<(), PatchError> {
    match op {
        Op::Add { path, value } => add(doc, path, value.clone()),
        Op::Remove { path } => remove(doc, path).map(|_| ()),
        Op::Replace { path, value } => replace(doc, path, value.clone()),
        Op::Move { path, from } => {
            if is_strict_prefix(from, path) {
                return Err(PatchError::InvalidTarget(format!(
                    "cannot move `{}` into its own child `{}`",
                    format_pointer(from),
                    format_pointer(path)
                )));
            }
            let moved = remove(doc, from)?;
            add(doc, path, moved)
        }
        Op::Copy { path, from } => {
            let copied = get(doc, from)
                .ok_or_else(|| PatchError::PathNotFound(format_pointer(from)))?
                .clone();
            add(doc, path, copied)
        }
        Op::Test { path, value } => {
            let actual = get(doc, path)
                .ok_or_else(|| PatchError::PathNotFound(format_pointer(path)))?;
            if actual != value {
                return Err(PatchError::TestFailed(format_pointer(path)));
            }
            Ok(())
        }
    }
}

/// Apply a whole operation list, fail-fast.
pub fn apply_ops(doc: &mut Value, ops: &[Op]) -> Result<(), PatchError> {
    for op in ops {
        apply_op(doc, op)?;
    }
    Ok(())
}

fn parent_of<'a>(doc: &'a mut Value, path: &Path) -> Result<(&'a mut Value, String), PatchError> {
    let (parent_path, key) = path.split_at(path.len() - 1);
    let parent = get_mut(doc, parent_path)
        .ok_or_else(|| PatchError::PathNotFound(format_pointer(parent_path)))?;
    Ok((parent, key[0].clone()))
}

fn add(doc: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent, key) = parent_of(doc, path)?;
    match parent {
        Value::Object(map) => {
            map.insert(key, value);
            Ok(())
        }
        Value::Array(arr) => {
            if key == APPEND_MARKER {
                arr.push(value);
                return Ok(());
            }
            if !is_valid_index(&key) {
                return Err(PatchError::InvalidIndex(key));
            }
            let idx: usize = key.parse().map_err(|_| PatchError::InvalidIndex(key.clone()))?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex(key));
            }
            arr.insert(idx, value);
            Ok(())
        }
        _ => Err(PatchError::InvalidTarget(format!(
            "`{}` is not a container",
            format_pointer(&path[..path.len() - 1])
        ))),
    }
}

fn remove(doc: &mut Value, path: &Path) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::InvalidTarget("cannot remove the root".into()));
    }
    let pointer = format_pointer(path);
    let (parent, key) = parent_of(doc, path)?;
    match parent {
        Value::Object(map) => map.remove(&key).ok_or(PatchError::PathNotFound(pointer)),
        Value::Array(arr) => {
            if !is_valid_index(&key) {
                return Err(PatchError::PathNotFound(pointer));
            }
            let idx: usize = key.parse().map_err(|_| PatchError::PathNotFound(pointer.clone()))?;
            if idx >= arr.len() {
                return Err(PatchError::PathNotFound(pointer));
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget(format!(
            "`{pointer}` is not inside a container"
        ))),
    }
}

fn replace(doc: &mut Value, path: &Path, value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let target = get_mut(doc, path)
        .ok_or_else(|| PatchError::PathNotFound(format_pointer(path)))?;
    *target = value;
    Ok(())
}
