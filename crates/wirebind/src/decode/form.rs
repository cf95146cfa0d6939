//! URL-encoded form decoding.
//!
//! `key=value` pairs with percent-decoding. Dotted keys (`a.b.c`) nest
//! records, bracketed keys (`scores[math]`) build map entries, and
//! repeated keys accumulate into a sequence in encounter order.

use indexmap::IndexMap;

use crate::decode::node::Node;
use crate::error::BindError;

/// Decode a form payload into a record node.
pub fn decode(raw: &[u8]) -> Result<Node, BindError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| BindError::MalformedPayload(format!("form payload is not UTF-8: {e}")))?;

    let mut root: IndexMap<String, Node> = IndexMap::new();
    for pair in text.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = unescape(key)?;
        let value = unescape(value)?;
        insert(&mut root, &key, value)?;
    }
    Ok(Node::Record(root))
}

/// Percent-decode one component, with `+` as space.
fn unescape(component: &str) -> Result<String, BindError> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|cow| cow.into_owned())
        .map_err(|e| BindError::MalformedPayload(format!("bad percent-encoding in `{component}`: {e}")))
}

/// Split `base[key]` into the base path and the bracketed map key.
fn split_map_key(key: &str) -> Result<(&str, Option<&str>), BindError> {
    match key.find('[') {
        Some(open) => {
            if !key.ends_with(']') || open + 1 > key.len() - 1 {
                return Err(BindError::MalformedPayload(format!(
                    "malformed map key `{key}`"
                )));
            }
            let map_key = &key[open + 1..key.len() - 1];
            if map_key.contains('[') || map_key.contains(']') {
                return Err(BindError::MalformedPayload(format!(
                    "malformed map key `{key}`"
                )));
            }
            Ok((&key[..open], Some(map_key)))
        }
        None => {
            if key.contains(']') {
                return Err(BindError::MalformedPayload(format!(
                    "malformed map key `{key}`"
                )));
            }
            Ok((key, None))
        }
    }
}

fn insert(root: &mut IndexMap<String, Node>, key: &str, value: String) -> Result<(), BindError> {
    let (path, map_key) = split_map_key(key)?;
    if path.is_empty() {
        return Err(BindError::MalformedPayload(format!("empty form key `{key}`")));
    }

    // walk dotted segments, creating nested records
    let mut segments = path.split('.').peekable();
    let mut current = root;
    let leaf = loop {
        let segment = segments.next().unwrap_or_default();
        if segment.is_empty() {
            return Err(BindError::MalformedPayload(format!(
                "empty segment in form key `{key}`"
            )));
        }
        if segments.peek().is_none() {
            break segment;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Node::Record(IndexMap::new()));
        current = match entry {
            Node::Record(map) => map,
            other => {
                return Err(BindError::MalformedPayload(format!(
                    "form key `{key}` addresses into a {}",
                    other.shape()
                )))
            }
        };
    };

    match map_key {
        Some(entry_key) => {
            let slot = current
                .entry(leaf.to_string())
                .or_insert_with(|| Node::Map(Vec::new()));
            match slot {
                Node::Map(entries) => {
                    // map semantics: a repeated key overwrites its entry
                    match entries.iter_mut().find(|(k, _)| k == entry_key) {
                        Some((_, v)) => *v = Node::text(value),
                        None => entries.push((entry_key.to_string(), Node::text(value))),
                    }
                }
                other => {
                    return Err(BindError::MalformedPayload(format!(
                        "form key `{key}` mixes map and {} values",
                        other.shape()
                    )))
                }
            }
        }
        None => match current.get_mut(leaf) {
            None => {
                current.insert(leaf.to_string(), Node::text(value));
            }
            Some(Node::Seq(items)) => items.push(Node::text(value)),
            Some(slot @ Node::Scalar(_)) => {
                let first = std::mem::replace(slot, Node::Absent);
                *slot = Node::Seq(vec![first, Node::text(value)]);
            }
            Some(other) => {
                return Err(BindError::MalformedPayload(format!(
                    "form key `{key}` mixes plain and {} values",
                    other.shape()
                )))
            }
        },
    }
    Ok(())
}
