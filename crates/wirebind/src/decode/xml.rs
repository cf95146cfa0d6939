//! XML decoding.
//!
//! The document's root element becomes the top-level record. Attributes
//! map to scalar entries, child elements to nested values, and repeated
//! child names to a sequence. A leaf element contributes its text.

use indexmap::IndexMap;

use crate::decode::node::Node;
use crate::error::BindError;

/// Decode an XML payload into a node tree.
pub fn decode(raw: &[u8]) -> Result<Node, BindError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| BindError::MalformedPayload(format!("XML payload is not UTF-8: {e}")))?;
    let doc = roxmltree::Document::parse(text)
        .map_err(|e| BindError::MalformedPayload(format!("invalid XML: {e}")))?;
    Ok(element_node(doc.root_element()))
}

fn element_node(element: roxmltree::Node<'_, '_>) -> Node {
    let children: Vec<_> = element.children().filter(|c| c.is_element()).collect();
    let has_attributes = element.attributes().next().is_some();

    if children.is_empty() && !has_attributes {
        // surrounding whitespace is formatting, not data
        let text = element.text().unwrap_or("").trim();
        return Node::text(text);
    }

    let mut record: IndexMap<String, Node> = IndexMap::new();
    for attribute in element.attributes() {
        record.insert(attribute.name().to_string(), Node::text(attribute.value()));
    }
    for child in children {
        let name = child.tag_name().name().to_string();
        let value = element_node(child);
        match record.get_mut(&name) {
            None => {
                record.insert(name, value);
            }
            Some(Node::Seq(items)) => items.push(value),
            Some(slot) => {
                let first = std::mem::replace(slot, Node::Absent);
                *slot = Node::Seq(vec![first, value]);
            }
        }
    }
    Node::Record(record)
}
