//! The format-agnostic intermediate value tree.
//!
//! Decoders produce a [`Node`] per payload; the assigner consumes it. A
//! tree lives for exactly one bind call and is never shared or persisted.

use indexmap::IndexMap;
use serde_json::Value;

/// A scalar leaf as a decoder saw it.
///
/// Form and XML only ever see text; JSON keeps its native scalar so the
/// assigner can require the declared kind without re-parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Json(Value),
}

/// One position in a decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// No value at this position (missing key, JSON `null`).
    Absent,
    Scalar(Scalar),
    Seq(Vec<Node>),
    /// Map entries in encounter order; keys stay text until the assigner
    /// resolves them against the declared key kind.
    Map(Vec<(String, Node)>),
    /// A record keyed by wire name, in encounter order.
    Record(IndexMap<String, Node>),
}

impl Node {
    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Node::Scalar(Scalar::Text(s.into()))
    }

    /// Convert a JSON value tree into a node tree.
    ///
    /// `null` maps to [`Node::Absent`]; objects keep their key order.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Node::Absent,
            Value::Array(items) => Node::Seq(items.into_iter().map(Node::from_json).collect()),
            Value::Object(map) => Node::Record(
                map.into_iter()
                    .map(|(k, v)| (k, Node::from_json(v)))
                    .collect(),
            ),
            scalar => Node::Scalar(Scalar::Json(scalar)),
        }
    }

    /// What this node looks like, for mismatch reporting.
    pub fn shape(&self) -> &'static str {
        match self {
            Node::Absent => "absent",
            Node::Scalar(_) => "scalar",
            Node::Seq(_) => "sequence",
            Node::Map(_) => "map",
            Node::Record(_) => "record",
        }
    }
}
