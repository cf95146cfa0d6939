//! The binding pipeline: decode, assign, validate.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::assign::assign;
use crate::decode::{decode, Format};
use crate::error::BindError;
use crate::schema::{describe, Described};
use crate::validate::{validate_value, ValidationError};

/// A bindable destination type.
pub trait Bind: Described + Serialize + DeserializeOwned {}

impl<T: Described + Serialize + DeserializeOwned> Bind for T {}

/// The outcome of a successful bind: the typed value plus whatever
/// validation errors its fields carry. Validation failures are data, not
/// errors; a non-empty list still comes with a fully populated value.
#[derive(Debug)]
pub struct Bound<T> {
    pub value: T,
    pub errors: Vec<ValidationError>,
}

impl<T> Bound<T> {
    /// True when the error list is empty.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Bind a raw payload in the given format to a typed value.
///
/// Form payloads are always validated; for JSON and XML the caller opts
/// in with `run_validation`. `content_type` is an advisory hint (see
/// [`decode`]).
pub fn bind<T: Bind>(
    format: Format,
    raw: &[u8],
    content_type: Option<&str>,
    run_validation: bool,
) -> Result<Bound<T>, BindError> {
    tracing::debug!(format = format.as_str(), bytes = raw.len(), "binding payload");
    let desc = describe::<T>()?;
    let node = decode(format, raw, content_type)?;
    let canonical = assign(&node, desc, format)?;
    let value: T = serde_json::from_value(canonical.clone())
        .map_err(|e| BindError::Represent(e.to_string()))?;
    let errors = if run_validation || format == Format::Form {
        validate_value(&canonical, desc)
    } else {
        Vec::new()
    };
    Ok(Bound { value, errors })
}

/// Bind a URL-encoded form payload. Declarative validation always runs.
pub fn bind_form<T: Bind>(raw: &[u8]) -> Result<Bound<T>, BindError> {
    bind(Format::Form, raw, None, true)
}

/// Bind a JSON payload, optionally validating.
pub fn bind_json<T: Bind>(raw: &[u8], run_validation: bool) -> Result<Bound<T>, BindError> {
    bind(Format::Json, raw, None, run_validation)
}

/// Bind an XML payload, optionally validating.
pub fn bind_xml<T: Bind>(raw: &[u8], run_validation: bool) -> Result<Bound<T>, BindError> {
    bind(Format::Xml, raw, None, run_validation)
}
