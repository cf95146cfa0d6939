//! The validation rule evaluator.
//!
//! Walks a canonical typed tree against its descriptor set, evaluating
//! each field's rules in declaration order. Evaluation is exhaustive, not
//! fail-fast: one field may accumulate one error per violated rule.
//! Errors are emitted in field-declaration order, then rule-declaration
//! order, so the same invalid value always yields the same error list.
//!
//! Rules that do not apply to a field's value shape yield nothing; only
//! `required` can fire on an unset field.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::BindError;
use crate::schema::{
    describe, Described, FieldDescriptor, NamedFormat, Rule, RuleKind, ScalarKind,
    TypeDescriptor, TypeTag,
};

/// Tolerance for `multipleof` over float-backed values: the residue of
/// `value / n` may differ from the nearest integer by at most this much.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// One field-scoped validation failure.
///
/// Serializes to the wire shape `{"field": ..., "error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    #[serde(rename = "error")]
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// The thin serializable envelope callers return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate an already-typed value against its declared rules.
pub fn validate<T: Described + Serialize>(value: &T) -> Result<Vec<ValidationError>, BindError> {
    let desc = describe::<T>()?;
    let tree = serde_json::to_value(value).map_err(|e| BindError::Represent(e.to_string()))?;
    Ok(validate_value(&tree, desc))
}

/// Validate a canonical tree against a descriptor set. Never fails.
pub fn validate_value(tree: &Value, desc: &TypeDescriptor) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let empty = Map::new();
    let record = tree.as_object().unwrap_or(&empty);
    validate_record(record, desc, "", &mut errors);
    errors
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn validate_record(
    record: &Map<String, Value>,
    desc: &TypeDescriptor,
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    for field in &desc.fields {
        let path = join(prefix, &field.name);
        let value = record.get(&field.name);
        for rule in &field.rules {
            if let Some(message) = check(rule, value, field) {
                errors.push(ValidationError::new(&path, message));
            }
        }
        check_empty_items(field, value, &path, errors);
        recurse(field, value, &path, errors);
    }
}

/// Descend into nested records, sequences of records, and maps of records.
fn recurse(
    field: &FieldDescriptor,
    value: Option<&Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    match (&field.tag, value) {
        (TypeTag::Nested(nested), Some(Value::Object(record))) => {
            validate_record(record, nested(), path, errors);
        }
        (TypeTag::Seq(elem), Some(Value::Array(items))) => {
            if let TypeTag::Nested(nested) = elem.as_ref() {
                for (i, item) in items.iter().enumerate() {
                    if let Value::Object(record) = item {
                        validate_record(record, nested(), &format!("{path}[{i}]"), errors);
                    }
                }
            }
        }
        (TypeTag::Map(_, value_tag), Some(Value::Object(entries))) => {
            if let TypeTag::Nested(nested) = value_tag.as_ref() {
                for (key, entry) in entries {
                    if let Value::Object(record) = entry {
                        validate_record(record, nested(), &format!("{path}[{key}]"), errors);
                    }
                }
            }
        }
        _ => {}
    }
}

// ── Rule checks ───────────────────────────────────────────────────────────

/// Evaluate one rule; `Some(message)` on violation.
fn check(rule: &Rule, value: Option<&Value>, field: &FieldDescriptor) -> Option<String> {
    let violated = match rule {
        Rule::Required => is_unset(value),
        Rule::Min(n) => number_of(value).map(|v| v < *n).unwrap_or(false),
        Rule::Max(n) => number_of(value).map(|v| v > *n).unwrap_or(false),
        Rule::MultipleOf(n) => violates_multiple_of(value, *n),
        Rule::MinLength(n) => char_count(value).map(|c| c < *n).unwrap_or(false),
        Rule::MaxLength(n) => char_count(value).map(|c| c > *n).unwrap_or(false),
        Rule::MinItems(n) => item_count(value).map(|c| c < *n).unwrap_or(false),
        Rule::MaxItems(n) => item_count(value).map(|c| c > *n).unwrap_or(false),
        Rule::UniqueItems => has_duplicate_items(value),
        Rule::EmptyItemsAllowed => false,
        Rule::Pattern(re) => string_of(value).map(|s| !re.is_match(s)).unwrap_or(false),
        Rule::Enum(allowed) => string_of(value)
            .map(|s| !allowed.iter().any(|a| a == s))
            .unwrap_or(false),
        Rule::Format(format) => string_of(value)
            .map(|s| !named_format_regex(*format).is_match(s))
            .unwrap_or(false),
    };
    if !violated {
        return None;
    }
    Some(
        field
            .message_for(rule.kind())
            .map(str::to_string)
            .unwrap_or_else(|| default_message(rule)),
    )
}

/// Sequences of strings reject zero-length elements unless the field
/// declares `emptyitems`. A whole-collection constraint: one error for
/// the field, not one per element.
fn check_empty_items(
    field: &FieldDescriptor,
    value: Option<&Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let is_string_seq = matches!(
        &field.tag,
        TypeTag::Seq(elem) if matches!(elem.as_ref(), TypeTag::Scalar(ScalarKind::String))
    );
    if !is_string_seq || field.has_rule(RuleKind::EmptyItemsAllowed) {
        return;
    }
    let Some(Value::Array(items)) = value else {
        return;
    };
    if items.iter().any(|v| v.as_str() == Some("")) {
        let message = field
            .message_for(RuleKind::EmptyItemsAllowed)
            .map(str::to_string)
            .unwrap_or_else(|| "must not contain empty items".to_string());
        errors.push(ValidationError::new(path, message));
    }
}

fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        // any number or boolean counts as set; zero is a value
        Some(Value::Number(_)) | Some(Value::Bool(_)) => false,
    }
}

fn number_of(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

fn string_of(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

fn char_count(value: Option<&Value>) -> Option<usize> {
    string_of(value).map(|s| s.chars().count())
}

fn item_count(value: Option<&Value>) -> Option<usize> {
    match value {
        Some(Value::Array(items)) => Some(items.len()),
        Some(Value::Object(map)) => Some(map.len()),
        _ => None,
    }
}

fn has_duplicate_items(value: Option<&Value>) -> bool {
    let Some(Value::Array(items)) = value else {
        return false;
    };
    for (i, a) in items.iter().enumerate() {
        if items[i + 1..].iter().any(|b| a == b) {
            return true;
        }
    }
    false
}

/// `multipleof` is exact for integer-backed values and tolerance-based
/// for floats (see [`MULTIPLE_OF_EPSILON`]).
fn violates_multiple_of(value: Option<&Value>, n: f64) -> bool {
    let Some(v) = value else { return false };
    if let (Some(i), true) = (v.as_i64(), n.fract() == 0.0) {
        return i % (n as i64) != 0;
    }
    let Some(f) = v.as_f64() else { return false };
    let ratio = f / n;
    (ratio - ratio.round()).abs() > MULTIPLE_OF_EPSILON
}

fn named_format_regex(format: NamedFormat) -> &'static Regex {
    match format {
        NamedFormat::Email => {
            static EMAIL: OnceLock<Regex> = OnceLock::new();
            EMAIL.get_or_init(|| {
                Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern")
            })
        }
    }
}

fn default_message(rule: &Rule) -> String {
    match rule {
        Rule::Required => "is required".to_string(),
        Rule::Min(n) => format!("must be at least {n}"),
        Rule::Max(n) => format!("must be at most {n}"),
        Rule::MultipleOf(n) => format!("must be a multiple of {n}"),
        Rule::MinLength(n) => format!("must be at least {n} characters"),
        Rule::MaxLength(n) => format!("must be at most {n} characters"),
        Rule::MinItems(n) => format!("must contain at least {n} items"),
        Rule::MaxItems(n) => format!("must contain at most {n} items"),
        Rule::UniqueItems => "must not contain duplicate items".to_string(),
        Rule::EmptyItemsAllowed => "must not contain empty items".to_string(),
        Rule::Pattern(_) => "does not match the required pattern".to_string(),
        Rule::Enum(allowed) => format!("must be one of {}", allowed.join(", ")),
        Rule::Format(NamedFormat::Email) => "must be a valid email address".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
