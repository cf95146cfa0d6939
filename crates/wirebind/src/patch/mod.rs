//! JSON Patch (RFC 6902) over typed values.
//!
//! The six standard operations (`add`, `remove`, `replace`, `move`,
//! `copy`, `test`) applied against a JSON-Pointer-addressed view of an
//! already-decoded value. After the full operation list succeeds, the
//! mutated tree goes back through the value assigner (so it still matches
//! the declared types) and, if requested, the validator.

pub mod apply;
pub mod codec;
pub mod types;

pub use apply::{apply_op, apply_ops};
pub use codec::{from_json, from_json_patch, to_json, to_json_patch};
pub use types::{Op, PatchError, JSON_PATCH_MEDIA_TYPE};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::assign::assign_canonical;
use crate::decode::Node;
use crate::error::BindError;
use crate::schema::{describe, Described};
use crate::validate::{validate_value, ValidationError};

/// Apply a raw patch document to a typed value, in place.
///
/// The media type must be exactly [`JSON_PATCH_MEDIA_TYPE`]. On success
/// the mutated value replaces `target` and the (possibly empty) validation
/// error list is returned; validation runs only when `run_validation` is
/// set. On failure `target` is left as it was (the patch runs against a
/// working copy), but callers should still treat a failed patch
/// destination as discarded.
pub fn apply_patch<T>(
    target: &mut T,
    raw: &[u8],
    content_type: &str,
    run_validation: bool,
) -> Result<Vec<ValidationError>, PatchError>
where
    T: Described + Serialize + DeserializeOwned,
{
    if !is_patch_media_type(content_type) {
        return Err(PatchError::UnsupportedMediaType(content_type.to_string()));
    }
    tracing::debug!(bytes = raw.len(), "applying patch document");

    let desc = describe::<T>().map_err(BindError::from)?;
    let document: Value = serde_json::from_slice(raw)
        .map_err(|e| PatchError::MalformedPatch(e.to_string()))?;
    let ops = from_json_patch(&document)?;

    let mut doc = serde_json::to_value(&*target)
        .map_err(|e| BindError::Represent(e.to_string()))?;
    apply_ops(&mut doc, &ops)?;

    // the mutated tree must still match the declared types
    let canonical = assign_canonical(&Node::from_json(doc), desc)?;
    let patched: T = serde_json::from_value(canonical.clone())
        .map_err(|e| BindError::Represent(e.to_string()))?;
    *target = patched;

    if run_validation {
        Ok(validate_value(&canonical, desc))
    } else {
        Ok(Vec::new())
    }
}

/// [`apply_patch`] for transport callers: additionally rejects any verb
/// other than `PATCH`.
pub fn apply_patch_request<T>(
    method: &str,
    target: &mut T,
    raw: &[u8],
    content_type: &str,
    run_validation: bool,
) -> Result<Vec<ValidationError>, PatchError>
where
    T: Described + Serialize + DeserializeOwned,
{
    if !method.eq_ignore_ascii_case("PATCH") {
        return Err(PatchError::MethodNotAllowed(method.to_string()));
    }
    apply_patch(target, raw, content_type, run_validation)
}

/// Media types compare case-insensitively, ignoring parameters.
fn is_patch_media_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case(JSON_PATCH_MEDIA_TYPE)
}
