//! JSON decoding.

use serde_json::Value;

use crate::decode::node::Node;
use crate::error::BindError;

/// Decode a JSON payload into a node tree.
///
/// Objects become records, arrays sequences, `null` absent. Numbers stay
/// `serde_json` numbers until the assigner coerces them, so integer
/// precision survives to the target kind.
pub fn decode(raw: &[u8]) -> Result<Node, BindError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| BindError::MalformedPayload(format!("invalid JSON: {e}")))?;
    Ok(Node::from_json(value))
}
