//! Field metadata: descriptors, the type registry, and verification.
//!
//! A destination type exposes one [`TypeDescriptor`] describing its fields:
//! wire names per format, a [`TypeTag`] classification, the parsed rule
//! list, and the custom-message table. Descriptors are built once on first
//! use (construct-then-publish, typically inside a `OnceLock`) and shared
//! read-only across concurrent binds.

use crate::decode::Format;
use crate::error::MetadataError;
use crate::schema::rules::{parse_messages, parse_rules, Rule, RuleKind};

// ── Type classification ───────────────────────────────────────────────────

/// Primitive value kinds a scalar field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Integer,
    Unsigned,
    Float,
    Bool,
}

impl ScalarKind {
    pub fn expected(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Unsigned => "unsigned integer",
            ScalarKind::Float => "number",
            ScalarKind::Bool => "boolean",
        }
    }
}

/// Declared kind of a map's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    String,
    Integer,
}

/// Lazy handle to a nested type's descriptor.
///
/// A function pointer rather than a reference so that descriptor
/// construction never recurses; the nested set is resolved on first walk.
pub type DescriptorFn = fn() -> &'static TypeDescriptor;

/// Classification of a field's value type.
#[derive(Debug, Clone)]
pub enum TypeTag {
    Scalar(ScalarKind),
    /// A time value, parsed with the field's declared layout.
    Time,
    /// A unique identifier in canonical UUID textual form.
    Uuid,
    Nested(DescriptorFn),
    Seq(Box<TypeTag>),
    Map(KeyKind, Box<TypeTag>),
}

// ── Field descriptors ─────────────────────────────────────────────────────

/// Cached metadata for one field of a destination type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Canonical name: the struct field's serde name. Keys of the
    /// canonical tree and validation paths use this name.
    pub name: String,
    pub form_name: Option<String>,
    pub json_name: Option<String>,
    pub xml_name: Option<String>,
    pub tag: TypeTag,
    pub rules: Vec<Rule>,
    pub messages: Vec<(RuleKind, String)>,
    /// True for pointer/Option-wrapped fields. Recorded for completeness;
    /// `required` is what forbids the unset state.
    pub optional: bool,
    pub time_layout: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            form_name: None,
            json_name: None,
            xml_name: None,
            tag,
            rules: Vec::new(),
            messages: Vec::new(),
            optional: false,
            time_layout: None,
        }
    }

    /// Parse and attach a rule list, e.g. `"required,min=18"`.
    pub fn rules(mut self, spec: &str) -> Result<Self, MetadataError> {
        self.rules = parse_rules(spec)?;
        Ok(self)
    }

    /// Parse and attach a custom-message table, e.g. `"required=X;min=Y"`.
    pub fn messages(mut self, spec: &str) -> Result<Self, MetadataError> {
        self.messages = parse_messages(spec)?;
        Ok(self)
    }

    pub fn form_name(mut self, name: impl Into<String>) -> Self {
        self.form_name = Some(name.into());
        self
    }

    pub fn json_name(mut self, name: impl Into<String>) -> Self {
        self.json_name = Some(name.into());
        self
    }

    pub fn xml_name(mut self, name: impl Into<String>) -> Self {
        self.xml_name = Some(name.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Declare the strftime layout for a [`TypeTag::Time`] field.
    pub fn time_layout(mut self, layout: impl Into<String>) -> Self {
        self.time_layout = Some(layout.into());
        self
    }

    /// The wire name used by the given format, defaulting to the
    /// canonical name.
    pub fn wire_name(&self, format: Format) -> &str {
        let specific = match format {
            Format::Form => self.form_name.as_deref(),
            Format::Json => self.json_name.as_deref(),
            Format::Xml => self.xml_name.as_deref(),
        };
        specific.unwrap_or(&self.name)
    }

    /// The custom message for a rule kind, if one was declared.
    pub fn message_for(&self, kind: RuleKind) -> Option<&str> {
        self.messages
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, m)| m.as_str())
    }

    pub(crate) fn has_rule(&self, kind: RuleKind) -> bool {
        self.rules.iter().any(|r| r.kind() == kind)
    }
}

// ── Type descriptors ──────────────────────────────────────────────────────

/// The ordered field set of one destination type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub type_name: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Flatten an embedded type's fields into this descriptor at the
    /// current position, as if they were declared inline.
    pub fn embed(mut self, nested: DescriptorFn) -> Self {
        self.fields.extend(nested().fields.iter().cloned());
        self
    }
}

// ── Registry ──────────────────────────────────────────────────────────────

/// Implemented by every bindable destination type.
///
/// Implementations build the descriptor once and publish it through a
/// `OnceLock`; malformed rule strings are a deployment bug, so failing
/// loudly there is appropriate:
///
/// ```
/// use std::sync::OnceLock;
/// use wirebind::schema::{Described, FieldDescriptor, ScalarKind, TypeDescriptor, TypeTag};
///
/// struct Account;
///
/// impl Described for Account {
///     fn descriptor() -> &'static TypeDescriptor {
///         static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
///         DESC.get_or_init(|| {
///             TypeDescriptor::new("Account").field(
///                 FieldDescriptor::new("name", TypeTag::Scalar(ScalarKind::String))
///                     .rules("required,minlength=2")
///                     .expect("Account.name rules"),
///             )
///         })
///     }
/// }
/// ```
pub trait Described {
    fn descriptor() -> &'static TypeDescriptor;
}

/// Fetch and verify a type's descriptor set.
///
/// Verification walks the nested-type graph with a visited-path set and a
/// depth guard: a cyclic declaration fails with
/// [`MetadataError::CyclicType`] instead of recursing forever. Shape
/// constraints that cannot be checked at field construction (a `Time`
/// field without a layout) are rejected here.
pub fn describe<T: Described>() -> Result<&'static TypeDescriptor, MetadataError> {
    let desc = T::descriptor();
    let mut path = Vec::new();
    verify(desc, &mut path)?;
    Ok(desc)
}

const MAX_NESTING_DEPTH: usize = 64;

fn verify(
    desc: &'static TypeDescriptor,
    path: &mut Vec<*const TypeDescriptor>,
) -> Result<(), MetadataError> {
    let ptr = desc as *const TypeDescriptor;
    if path.contains(&ptr) || path.len() > MAX_NESTING_DEPTH {
        return Err(MetadataError::CyclicType(desc.type_name));
    }
    path.push(ptr);
    for field in &desc.fields {
        verify_tag(desc, field, &field.tag, path)?;
    }
    path.pop();
    Ok(())
}

fn verify_tag(
    desc: &TypeDescriptor,
    field: &FieldDescriptor,
    tag: &TypeTag,
    path: &mut Vec<*const TypeDescriptor>,
) -> Result<(), MetadataError> {
    match tag {
        TypeTag::Time => {
            if field.time_layout.is_none() {
                return Err(MetadataError::Malformed(format!(
                    "time field `{}.{}` declares no layout",
                    desc.type_name, field.name
                )));
            }
            Ok(())
        }
        TypeTag::Nested(nested) => verify(nested(), path),
        TypeTag::Seq(elem) => verify_tag(desc, field, elem, path),
        TypeTag::Map(_, value) => verify_tag(desc, field, value, path),
        TypeTag::Scalar(_) | TypeTag::Uuid => Ok(()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
