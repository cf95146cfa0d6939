//! Per-format decoders producing the intermediate value tree.

pub mod form;
pub mod json;
pub mod node;
pub mod xml;

pub use node::{Node, Scalar};

use crate::error::BindError;

/// A supported wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Form,
    Json,
    Xml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Form => "form",
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

/// Decode a raw payload in the requested format.
///
/// The content-type hint is advisory: the caller names the format, and the
/// hint only rejects requests that directly contradict it (a JSON bind fed
/// an XML content type, or vice versa).
pub fn decode(
    format: Format,
    raw: &[u8],
    content_type: Option<&str>,
) -> Result<Node, BindError> {
    if let Some(hint) = content_type {
        if contradicts(format, hint) {
            return Err(BindError::UnsupportedContentType(hint.to_string()));
        }
    }
    match format {
        Format::Form => form::decode(raw),
        Format::Json => json::decode(raw),
        Format::Xml => xml::decode(raw),
    }
}

fn contradicts(format: Format, hint: &str) -> bool {
    let hint = hint.to_ascii_lowercase();
    match format {
        Format::Json => hint.contains("xml"),
        Format::Xml => hint.contains("json"),
        Format::Form => hint.contains("json") || hint.contains("xml"),
    }
}
