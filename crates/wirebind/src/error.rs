//! Error taxonomy for binding and metadata extraction.
//!
//! Validation failures are data, not errors: they travel as
//! [`Vec<ValidationError>`](crate::validate::ValidationError) and never
//! appear here. These enums cover the hard failures only.

use thiserror::Error;

/// Programmer error in a type's declared metadata.
///
/// Surfaced on first use of the destination type, never per request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("MALFORMED_METADATA: unknown rule `{0}`")]
    UnknownRule(String),
    #[error("MALFORMED_METADATA: rule `{rule}` has invalid parameter `{param}`")]
    BadParameter { rule: String, param: String },
    #[error("MALFORMED_METADATA: {0}")]
    Malformed(String),
    #[error("CYCLIC_TYPE: `{0}`")]
    CyclicType(&'static str),
}

/// Hard failure while decoding or assigning a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("MALFORMED_PAYLOAD: {0}")]
    MalformedPayload(String),
    #[error("UNSUPPORTED_CONTENT_TYPE: {0}")]
    UnsupportedContentType(String),
    /// The payload cannot be represented as the destination type.
    /// Aborts the whole assignment; no partial value is produced.
    #[error("TYPE_MISMATCH at `{path}`: expected {expected}")]
    TypeMismatch { path: String, expected: String },
    /// The coerced tree failed to deserialize into the destination type.
    #[error("TYPE_MISMATCH: {0}")]
    Represent(String),
}

impl BindError {
    pub(crate) fn mismatch(path: &str, expected: impl Into<String>) -> Self {
        BindError::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
        }
    }
}
