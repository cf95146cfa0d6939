//! The value assigner.
//!
//! Walks field metadata and a decoded [`Node`] tree in lockstep, coercing
//! wire scalars into their declared kinds and recursing into nested
//! records, sequences, and maps. The output is a canonical typed tree
//! (`serde_json::Value`) in field-declaration order, ready to deserialize
//! into the destination type.
//!
//! A single mismatch anywhere aborts the whole assignment: the payload
//! cannot be represented as the destination type, which is a hard error,
//! not a validation failure. Absent fields are omitted from the tree;
//! required-ness is the validator's concern.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::decode::{Format, Node, Scalar};
use crate::error::BindError;
use crate::schema::{FieldDescriptor, KeyKind, ScalarKind, TypeDescriptor, TypeTag};

/// How field values are looked up in a record node.
#[derive(Debug, Clone, Copy)]
enum Lookup {
    /// By the field's wire name for the given format (binding).
    Wire(Format),
    /// By the canonical name (re-assigning an already-typed tree).
    Canonical,
}

/// Assign a decoded payload to a descriptor set, by wire name.
pub fn assign(node: &Node, desc: &TypeDescriptor, format: Format) -> Result<Value, BindError> {
    assign_record(node, desc, Lookup::Wire(format), "")
}

/// Assign a tree that already uses canonical field names, e.g. the
/// serialized form of a typed value mutated by a patch.
pub(crate) fn assign_canonical(node: &Node, desc: &TypeDescriptor) -> Result<Value, BindError> {
    assign_record(node, desc, Lookup::Canonical, "")
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn assign_record(
    node: &Node,
    desc: &TypeDescriptor,
    lookup: Lookup,
    path: &str,
) -> Result<Value, BindError> {
    let record = match node {
        Node::Absent => return Ok(Value::Object(Map::new())),
        Node::Record(map) => map,
        other => {
            return Err(BindError::mismatch(
                path,
                format!("record, got {}", other.shape()),
            ))
        }
    };

    let mut out = Map::new();
    for field in &desc.fields {
        let key = match lookup {
            Lookup::Wire(format) => field.wire_name(format),
            Lookup::Canonical => field.name.as_str(),
        };
        let child = match record.get(key) {
            None => continue,
            Some(node) if node.is_absent() => continue,
            Some(node) => node,
        };
        let child_path = join(path, &field.name);
        if let Some(value) = coerce(child, &field.tag, field, lookup, &child_path)? {
            out.insert(field.name.clone(), value);
        }
    }
    Ok(Value::Object(out))
}

/// Coerce one node against a type tag.
///
/// `Ok(None)` means "treat as unset": an empty wire string where a
/// non-string value was declared, the form/XML idiom for a field left
/// blank.
fn coerce(
    node: &Node,
    tag: &TypeTag,
    field: &FieldDescriptor,
    lookup: Lookup,
    path: &str,
) -> Result<Option<Value>, BindError> {
    match tag {
        TypeTag::Scalar(kind) => match node {
            Node::Scalar(Scalar::Text(s)) => coerce_text(s, *kind, path),
            Node::Scalar(Scalar::Json(v)) => coerce_json(v, *kind, path).map(Some),
            other => Err(BindError::mismatch(
                path,
                format!("{}, got {}", kind.expected(), other.shape()),
            )),
        },
        TypeTag::Time => {
            let text = scalar_text(node, path, "time string")?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            // layout presence is checked at describe() time
            let layout = field.time_layout.as_deref().unwrap_or_default();
            coerce_time(text.trim(), layout)
                .map(|s| Some(Value::String(s)))
                .ok_or_else(|| {
                    BindError::mismatch(path, format!("time matching layout `{layout}`"))
                })
        }
        TypeTag::Uuid => {
            let text = scalar_text(node, path, "UUID string")?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            let parsed = Uuid::parse_str(text.trim())
                .map_err(|_| BindError::mismatch(path, "UUID"))?;
            Ok(Some(Value::String(parsed.hyphenated().to_string())))
        }
        TypeTag::Nested(nested) => {
            assign_record(node, nested(), lookup, path).map(Some)
        }
        TypeTag::Seq(elem) => {
            let items: Vec<&Node> = match node {
                Node::Seq(items) => items.iter().collect(),
                Node::Map(_) => {
                    return Err(BindError::mismatch(path, "sequence, got map"));
                }
                single => vec![single],
            };
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                let value = coerce(item, elem, field, lookup, &item_path)?.ok_or_else(|| {
                    BindError::mismatch(&item_path, expected_of(elem))
                })?;
                out.push(value);
            }
            Ok(Some(Value::Array(out)))
        }
        TypeTag::Map(key_kind, value_tag) => {
            let entries: Vec<(&str, &Node)> = match node {
                Node::Map(entries) => entries.iter().map(|(k, v)| (k.as_str(), v)).collect(),
                Node::Record(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
                other => {
                    return Err(BindError::mismatch(
                        path,
                        format!("map, got {}", other.shape()),
                    ))
                }
            };
            let mut out = Map::new();
            for (key, child) in entries {
                let entry_path = format!("{path}[{key}]");
                let canonical_key = match key_kind {
                    KeyKind::String => key.to_string(),
                    KeyKind::Integer => key
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| BindError::mismatch(&entry_path, "integer map key"))?
                        .to_string(),
                };
                let value = coerce(child, value_tag, field, lookup, &entry_path)?
                    .ok_or_else(|| BindError::mismatch(&entry_path, expected_of(value_tag)))?;
                out.insert(canonical_key, value);
            }
            Ok(Some(Value::Object(out)))
        }
    }
}

fn expected_of(tag: &TypeTag) -> String {
    match tag {
        TypeTag::Scalar(kind) => kind.expected().to_string(),
        TypeTag::Time => "time".to_string(),
        TypeTag::Uuid => "UUID".to_string(),
        TypeTag::Nested(_) => "record".to_string(),
        TypeTag::Seq(_) => "sequence".to_string(),
        TypeTag::Map(..) => "map".to_string(),
    }
}

fn scalar_text<'a>(node: &'a Node, path: &str, expected: &str) -> Result<&'a str, BindError> {
    match node {
        Node::Scalar(Scalar::Text(s)) => Ok(s),
        Node::Scalar(Scalar::Json(Value::String(s))) => Ok(s),
        other => Err(BindError::mismatch(
            path,
            format!("{expected}, got {}", other.shape()),
        )),
    }
}

// ── Scalar coercions ──────────────────────────────────────────────────────

fn coerce_text(s: &str, kind: ScalarKind, path: &str) -> Result<Option<Value>, BindError> {
    if kind != ScalarKind::String && s.trim().is_empty() {
        return Ok(None);
    }
    let value = match kind {
        ScalarKind::String => Value::String(s.to_string()),
        ScalarKind::Integer => s
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| BindError::mismatch(path, kind.expected()))?,
        ScalarKind::Unsigned => s
            .trim()
            .parse::<u64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| BindError::mismatch(path, kind.expected()))?,
        ScalarKind::Float => {
            let parsed: f64 = s
                .trim()
                .parse()
                .map_err(|_| BindError::mismatch(path, kind.expected()))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| BindError::mismatch(path, kind.expected()))?
        }
        ScalarKind::Bool => Value::Bool(coerce_bool(s).ok_or_else(|| {
            BindError::mismatch(path, "boolean (true/false/1/0/yes/no)")
        })?),
    };
    Ok(Some(value))
}

fn coerce_json(v: &Value, kind: ScalarKind, path: &str) -> Result<Value, BindError> {
    let mismatch = || BindError::mismatch(path, kind.expected());
    match kind {
        ScalarKind::String => v.as_str().map(|s| Value::String(s.to_string())),
        ScalarKind::Integer => v.as_i64().map(|n| Value::Number(n.into())),
        ScalarKind::Unsigned => v.as_u64().map(|n| Value::Number(n.into())),
        ScalarKind::Float => v
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ScalarKind::Bool => v.as_bool().map(Value::Bool),
    }
    .ok_or_else(mismatch)
}

/// The canonical boolean token set, case-insensitive.
fn coerce_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a time string with a declared strftime layout and canonicalize:
/// offset-aware to RFC 3339, naive datetime to ISO 8601, date to
/// `%Y-%m-%d`. The canonical forms match chrono's serde representations,
/// so typed fields deserialize directly.
fn coerce_time(s: &str, layout: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_str(s, layout) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
        return Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use crate::schema::FieldDescriptor;
    use serde_json::json;
    use std::sync::OnceLock;

    fn address_descriptor() -> &'static TypeDescriptor {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        DESC.get_or_init(|| {
            TypeDescriptor::new("Address")
                .field(FieldDescriptor::new("city", TypeTag::Scalar(ScalarKind::String)))
                .field(FieldDescriptor::new("zip", TypeTag::Scalar(ScalarKind::String)))
        })
    }

    fn profile_descriptor() -> &'static TypeDescriptor {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        DESC.get_or_init(|| {
            TypeDescriptor::new("Profile")
                .field(FieldDescriptor::new("name", TypeTag::Scalar(ScalarKind::String)))
                .field(FieldDescriptor::new("age", TypeTag::Scalar(ScalarKind::Integer)))
                .field(FieldDescriptor::new("score", TypeTag::Scalar(ScalarKind::Float)))
                .field(FieldDescriptor::new("active", TypeTag::Scalar(ScalarKind::Bool)))
                .field(FieldDescriptor::new(
                    "address",
                    TypeTag::Nested(address_descriptor),
                ))
                .field(FieldDescriptor::new(
                    "hobbies",
                    TypeTag::Seq(Box::new(TypeTag::Scalar(ScalarKind::String))),
                ))
                .field(FieldDescriptor::new(
                    "scores",
                    TypeTag::Map(KeyKind::String, Box::new(TypeTag::Scalar(ScalarKind::Integer))),
                ))
                .field(
                    FieldDescriptor::new("born", TypeTag::Time).time_layout("%Y-%m-%d"),
                )
                .field(FieldDescriptor::new("id", TypeTag::Uuid))
        })
    }

    fn from_form(payload: &[u8]) -> Result<Value, BindError> {
        let node = decode::form::decode(payload).unwrap();
        assign(&node, profile_descriptor(), Format::Form)
    }

    #[test]
    fn coerces_form_scalars() {
        let value =
            from_form(b"name=Ada&age=36&score=9.5&active=yes").unwrap();
        assert_eq!(
            value,
            json!({"name": "Ada", "age": 36, "score": 9.5, "active": true})
        );
    }

    #[test]
    fn absent_fields_are_omitted() {
        let value = from_form(b"name=Ada").unwrap();
        assert_eq!(value, json!({"name": "Ada"}));
    }

    #[test]
    fn empty_text_for_non_string_is_unset() {
        let value = from_form(b"name=&age=&born=&id=").unwrap();
        // the string keeps its empty value; the others are unset
        assert_eq!(value, json!({"name": ""}));
    }

    #[test]
    fn nested_records_recurse() {
        let value = from_form(b"address.city=Oslo&address.zip=0150").unwrap();
        assert_eq!(value, json!({"address": {"city": "Oslo", "zip": "0150"}}));
    }

    #[test]
    fn repeated_keys_build_typed_sequences() {
        let value = from_form(b"hobbies=chess&hobbies=go").unwrap();
        assert_eq!(value, json!({"hobbies": ["chess", "go"]}));
    }

    #[test]
    fn single_value_binds_as_one_element_sequence() {
        let value = from_form(b"hobbies=chess").unwrap();
        assert_eq!(value, json!({"hobbies": ["chess"]}));
    }

    #[test]
    fn map_entries_coerce_keys_and_values() {
        let value = from_form(b"scores[math]=95&scores[science]=87").unwrap();
        assert_eq!(value, json!({"scores": {"math": 95, "science": 87}}));
    }

    #[test]
    fn integer_map_keys_normalize() {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        fn desc() -> &'static TypeDescriptor {
            DESC.get_or_init(|| {
                TypeDescriptor::new("Ranks").field(FieldDescriptor::new(
                    "by_place",
                    TypeTag::Map(KeyKind::Integer, Box::new(TypeTag::Scalar(ScalarKind::String))),
                ))
            })
        }
        let node = decode::form::decode(b"by_place[007]=Ada&by_place[2]=Grace").unwrap();
        let value = assign(&node, desc(), Format::Form).unwrap();
        assert_eq!(value, json!({"by_place": {"7": "Ada", "2": "Grace"}}));
    }

    #[test]
    fn non_integer_map_key_is_a_mismatch() {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        fn desc() -> &'static TypeDescriptor {
            DESC.get_or_init(|| {
                TypeDescriptor::new("Ranks").field(FieldDescriptor::new(
                    "by_place",
                    TypeTag::Map(KeyKind::Integer, Box::new(TypeTag::Scalar(ScalarKind::String))),
                ))
            })
        }
        let node = decode::form::decode(b"by_place[gold]=Ada").unwrap();
        let err = assign(&node, desc(), Format::Form).unwrap_err();
        assert!(matches!(
            err,
            BindError::TypeMismatch { ref path, .. } if path == "by_place[gold]"
        ));
    }

    #[test]
    fn time_canonicalizes_by_layout() {
        let value = from_form(b"born=1815-12-10").unwrap();
        assert_eq!(value, json!({"born": "1815-12-10"}));
    }

    #[test]
    fn time_layout_mismatch_is_hard_error() {
        let err = from_form(b"born=10/12/1815").unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { ref path, .. } if path == "born"));
    }

    #[test]
    fn uuid_canonicalizes() {
        let value = from_form(b"id=67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!(
            value,
            json!({"id": "67e55044-10b1-426f-9247-bb680e5fe0c8"})
        );
    }

    #[test]
    fn invalid_uuid_is_a_mismatch() {
        assert!(from_form(b"id=not-a-uuid").is_err());
    }

    #[test]
    fn non_numeric_text_aborts_assignment() {
        let err = from_form(b"name=Ada&age=old").unwrap_err();
        assert_eq!(
            err,
            BindError::TypeMismatch {
                path: "age".to_string(),
                expected: "integer".to_string()
            }
        );
    }

    #[test]
    fn ambiguous_bool_token_is_rejected() {
        assert!(from_form(b"active=maybe").is_err());
        assert!(from_form(b"active=TRUE").is_ok());
        assert!(from_form(b"active=0").is_ok());
    }

    #[test]
    fn json_scalars_must_carry_declared_kind() {
        let node = decode::json::decode(br#"{"age": "36"}"#).unwrap();
        let err = assign(&node, profile_descriptor(), Format::Json).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));

        let node = decode::json::decode(br#"{"age": 36}"#).unwrap();
        let value = assign(&node, profile_descriptor(), Format::Json).unwrap();
        assert_eq!(value, json!({"age": 36}));
    }

    #[test]
    fn json_fractional_number_is_not_an_integer() {
        let node = decode::json::decode(br#"{"age": 36.5}"#).unwrap();
        assert!(assign(&node, profile_descriptor(), Format::Json).is_err());
    }

    #[test]
    fn sequence_element_mismatch_names_the_ordinal() {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        fn desc() -> &'static TypeDescriptor {
            DESC.get_or_init(|| {
                TypeDescriptor::new("Nums").field(FieldDescriptor::new(
                    "nums",
                    TypeTag::Seq(Box::new(TypeTag::Scalar(ScalarKind::Integer))),
                ))
            })
        }
        let node = decode::form::decode(b"nums=1&nums=x&nums=3").unwrap();
        let err = assign(&node, desc(), Format::Form).unwrap_err();
        assert!(matches!(
            err,
            BindError::TypeMismatch { ref path, .. } if path == "nums[1]"
        ));
    }

    #[test]
    fn canonical_lookup_ignores_wire_names() {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        fn desc() -> &'static TypeDescriptor {
            DESC.get_or_init(|| {
                TypeDescriptor::new("Renamed").field(
                    FieldDescriptor::new("user_name", TypeTag::Scalar(ScalarKind::String))
                        .json_name("userName"),
                )
            })
        }
        let wire = Node::from_json(json!({"userName": "Ada"}));
        assert_eq!(
            assign(&wire, desc(), Format::Json).unwrap(),
            json!({"user_name": "Ada"})
        );
        let canonical = Node::from_json(json!({"user_name": "Ada"}));
        assert_eq!(
            assign_canonical(&canonical, desc()).unwrap(),
            json!({"user_name": "Ada"})
        );
    }

    #[test]
    fn time_with_offset_layout_canonicalizes_to_rfc3339() {
        static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
        fn desc() -> &'static TypeDescriptor {
            DESC.get_or_init(|| {
                TypeDescriptor::new("Stamped").field(
                    FieldDescriptor::new("at", TypeTag::Time)
                        .time_layout("%Y-%m-%d %H:%M:%S %z"),
                )
            })
        }
        let node = decode::form::decode(b"at=2024-06-01+12:30:00+%2B0200").unwrap();
        let value = assign(&node, desc(), Format::Form).unwrap();
        assert_eq!(value, json!({"at": "2024-06-01T12:30:00+02:00"}));
    }
}
