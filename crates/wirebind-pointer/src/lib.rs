//! JSON Pointer (RFC 6901) primitives.
//!
//! Parsing, formatting, escaping, and value lookup for slash-delimited
//! pointer paths into `serde_json` value trees.
//!
//! # Example
//!
//! ```
//! use wirebind_pointer::{parse_pointer, format_pointer, get};
//!
//! let path = parse_pointer("/user/emails/0").unwrap();
//! assert_eq!(path, vec!["user", "emails", "0"]);
//! assert_eq!(format_pointer(&path), "/user/emails/0");
//!
//! let doc = serde_json::json!({"user": {"emails": ["a@b.com"]}});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!("a@b.com")));
//! ```

use serde_json::Value;
use thiserror::Error;

/// One step of a pointer path (an object key or a decimal array index).
pub type PathStep = String;

/// A parsed pointer path. Empty means the document root.
pub type Path = Vec<PathStep>;

/// The append marker for array locations, per RFC 6901 / RFC 6902.
pub const APPEND_MARKER: &str = "-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("POINTER_INVALID: {0}")]
    Invalid(String),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("NO_PARENT")]
    NoParent,
}

/// Unescape one pointer step: `~1` becomes `/`, `~0` becomes `~`.
///
/// ```
/// use wirebind_pointer::unescape_step;
///
/// assert_eq!(unescape_step("a~0b"), "a~b");
/// assert_eq!(unescape_step("c~1d"), "c/d");
/// ```
pub fn unescape_step(step: &str) -> String {
    if !step.contains('~') {
        return step.to_string();
    }
    // ~1 must be rewritten before ~0
    step.replace("~1", "/").replace("~0", "~")
}

/// Escape one pointer step: `~` becomes `~0`, `/` becomes `~1`.
///
/// ```
/// use wirebind_pointer::escape_step;
///
/// assert_eq!(escape_step("a~b"), "a~0b");
/// assert_eq!(escape_step("c/d"), "c~1d");
/// ```
pub fn escape_step(step: &str) -> String {
    if !step.contains('~') && !step.contains('/') {
        return step.to_string();
    }
    // ~ must be rewritten before /
    step.replace('~', "~0").replace('/', "~1")
}

/// Parse a pointer string into a path.
///
/// The empty string is the root path. Any other pointer must begin with
/// `/`; anything else is rejected rather than silently reinterpreted.
///
/// ```
/// use wirebind_pointer::{parse_pointer, PointerError};
///
/// assert_eq!(parse_pointer("").unwrap(), Vec::<String>::new());
/// assert_eq!(parse_pointer("/a~0b/c~1d").unwrap(), vec!["a~b", "c/d"]);
/// assert!(matches!(parse_pointer("no-slash"), Err(PointerError::Invalid(_))));
/// ```
pub fn parse_pointer(pointer: &str) -> Result<Path, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(PointerError::Invalid(pointer.to_string()));
    }
    Ok(pointer[1..].split('/').map(unescape_step).collect())
}

/// Format a path back into a pointer string. The root path formats as `""`.
///
/// ```
/// use wirebind_pointer::format_pointer;
///
/// assert_eq!(format_pointer(&[]), "");
/// assert_eq!(format_pointer(&["a~b".to_string()]), "/a~0b");
/// ```
pub fn format_pointer(path: &[PathStep]) -> String {
    let mut out = String::new();
    for step in path {
        out.push('/');
        out.push_str(&escape_step(step));
    }
    out
}

/// Check whether a step is a valid array index: decimal digits with no
/// leading zero (except `"0"` itself).
///
/// ```
/// use wirebind_pointer::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("007"));
/// assert!(!is_valid_index("-1"));
/// ```
pub fn is_valid_index(step: &str) -> bool {
    let bytes = step.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// The parent of a path. The root path has no parent.
pub fn parent(path: &[PathStep]) -> Result<Path, PointerError> {
    if path.is_empty() {
        return Err(PointerError::NoParent);
    }
    Ok(path[..path.len() - 1].to_vec())
}

/// Check whether `prefix` is a strict prefix of `path`.
///
/// Equal paths are not strict prefixes of each other.
pub fn is_strict_prefix(prefix: &[PathStep], path: &[PathStep]) -> bool {
    prefix.len() < path.len() && path[..prefix.len()] == prefix[..]
}

/// Look up a value by path. `None` if any step is missing or invalid.
///
/// The append marker resolves to `None` for reads: it names a location
/// past the end of an array, never an existing value.
pub fn get<'a>(doc: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut current = doc;
    for step in path {
        match current {
            Value::Array(arr) => {
                if step == APPEND_MARKER || !is_valid_index(step) {
                    return None;
                }
                current = arr.get(step.parse::<usize>().ok()?)?;
            }
            Value::Object(map) => {
                current = map.get(step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(doc: &'a mut Value, path: &[PathStep]) -> Option<&'a mut Value> {
    let mut current = doc;
    for step in path {
        match current {
            Value::Array(arr) => {
                if step == APPEND_MARKER || !is_valid_index(step) {
                    return None;
                }
                current = arr.get_mut(step.parse::<usize>().ok()?)?;
            }
            Value::Object(map) => {
                current = map.get_mut(step)?;
            }
            _ => return None,
        }
    }
    Some(current)
}
