//! Core types for the patch engine.

use serde_json::Value;
use thiserror::Error;

pub use wirebind_pointer::Path;

/// The exact media type the patch path accepts.
pub const JSON_PATCH_MEDIA_TYPE: &str = "application/json-patch+json";

// ── Error ─────────────────────────────────────────────────────────────────

/// Hard failure while parsing or applying a patch.
///
/// Any of these aborts the whole patch; the caller must treat the target
/// as possibly mutated and discard it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("UNSUPPORTED_MEDIA_TYPE: {0}")]
    UnsupportedMediaType(String),
    #[error("METHOD_NOT_ALLOWED: {0}")]
    MethodNotAllowed(String),
    #[error("MALFORMED_PATCH: {0}")]
    MalformedPatch(String),
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
    #[error("PATH_NOT_FOUND: `{0}`")]
    PathNotFound(String),
    #[error("INVALID_INDEX: `{0}`")]
    InvalidIndex(String),
    #[error("INVALID_TARGET: {0}")]
    InvalidTarget(String),
    #[error("TEST_FAILED at `{0}`")]
    TestFailed(String),
    #[error(transparent)]
    Bind(#[from] crate::error::BindError),
}

// ── Op enum ───────────────────────────────────────────────────────────────

/// One RFC 6902 patch operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { path: Path, from: Path },
    Copy { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl Op {
    /// The operation's wire name.
    pub fn op_name(&self) -> &'static str {
        match self {
            Op::Add { .. } => "add",
            Op::Remove { .. } => "remove",
            Op::Replace { .. } => "replace",
            Op::Move { .. } => "move",
            Op::Copy { .. } => "copy",
            Op::Test { .. } => "test",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Op::Add { path, .. } => path,
            Op::Remove { path } => path,
            Op::Replace { path, .. } => path,
            Op::Move { path, .. } => path,
            Op::Copy { path, .. } => path,
            Op::Test { path, .. } => path,
        }
    }
}
