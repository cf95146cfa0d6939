//! Declarative field metadata: the rule model and type descriptors.

pub mod descriptor;
pub mod rules;

pub use descriptor::{
    describe, Described, DescriptorFn, FieldDescriptor, KeyKind, ScalarKind, TypeDescriptor,
    TypeTag,
};
pub use rules::{parse_messages, parse_rules, NamedFormat, Rule, RuleKind};
