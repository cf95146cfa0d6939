//! The rule model and its tag mini-language.
//!
//! Rule lists are written as comma-separated items, each a bare word or a
//! `key=value` pair; `enum` values are `|`-separated. Custom messages are
//! `;`-separated `rule=message` pairs. Both are parsed and shape-checked
//! once, at metadata-extraction time: a malformed rule string is a
//! [`MetadataError`], never a per-request failure.

use regex::Regex;

use crate::error::MetadataError;

// ── Rule kinds ────────────────────────────────────────────────────────────

/// The closed set of rule kinds, used to key custom messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Required,
    Min,
    Max,
    MultipleOf,
    MinLength,
    MaxLength,
    MinItems,
    MaxItems,
    UniqueItems,
    EmptyItemsAllowed,
    Pattern,
    Enum,
    Format,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::MultipleOf => "multipleof",
            RuleKind::MinLength => "minlength",
            RuleKind::MaxLength => "maxlength",
            RuleKind::MinItems => "minitems",
            RuleKind::MaxItems => "maxitems",
            RuleKind::UniqueItems => "uniqueitems",
            RuleKind::EmptyItemsAllowed => "emptyitems",
            RuleKind::Pattern => "pattern",
            RuleKind::Enum => "enum",
            RuleKind::Format => "format",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, MetadataError> {
        match s {
            "required" => Ok(RuleKind::Required),
            "min" => Ok(RuleKind::Min),
            "max" => Ok(RuleKind::Max),
            "multipleof" => Ok(RuleKind::MultipleOf),
            "minlength" => Ok(RuleKind::MinLength),
            "maxlength" => Ok(RuleKind::MaxLength),
            "minitems" => Ok(RuleKind::MinItems),
            "maxitems" => Ok(RuleKind::MaxItems),
            "uniqueitems" => Ok(RuleKind::UniqueItems),
            "emptyitems" => Ok(RuleKind::EmptyItemsAllowed),
            "pattern" => Ok(RuleKind::Pattern),
            "enum" => Ok(RuleKind::Enum),
            "format" => Ok(RuleKind::Format),
            other => Err(MetadataError::UnknownRule(other.to_string())),
        }
    }
}

/// Named shorthand pattern families for `format=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedFormat {
    Email,
}

impl NamedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamedFormat::Email => "email",
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────

/// A parsed validation rule with its typed parameter.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Min(f64),
    Max(f64),
    MultipleOf(f64),
    MinLength(usize),
    MaxLength(usize),
    MinItems(usize),
    MaxItems(usize),
    UniqueItems,
    EmptyItemsAllowed,
    Pattern(Regex),
    Enum(Vec<String>),
    Format(NamedFormat),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required => RuleKind::Required,
            Rule::Min(_) => RuleKind::Min,
            Rule::Max(_) => RuleKind::Max,
            Rule::MultipleOf(_) => RuleKind::MultipleOf,
            Rule::MinLength(_) => RuleKind::MinLength,
            Rule::MaxLength(_) => RuleKind::MaxLength,
            Rule::MinItems(_) => RuleKind::MinItems,
            Rule::MaxItems(_) => RuleKind::MaxItems,
            Rule::UniqueItems => RuleKind::UniqueItems,
            Rule::EmptyItemsAllowed => RuleKind::EmptyItemsAllowed,
            Rule::Pattern(_) => RuleKind::Pattern,
            Rule::Enum(_) => RuleKind::Enum,
            Rule::Format(_) => RuleKind::Format,
        }
    }
}

// ── Mini-language parsers ─────────────────────────────────────────────────

fn bad(rule: &str, param: &str) -> MetadataError {
    MetadataError::BadParameter {
        rule: rule.to_string(),
        param: param.to_string(),
    }
}

fn parse_f64(rule: &str, param: &str) -> Result<f64, MetadataError> {
    param.parse().map_err(|_| bad(rule, param))
}

fn parse_usize(rule: &str, param: &str) -> Result<usize, MetadataError> {
    param.parse().map_err(|_| bad(rule, param))
}

/// Parse a comma-separated rule list, e.g. `"required,min=18,enum=a|b"`.
pub fn parse_rules(spec: &str) -> Result<Vec<Rule>, MetadataError> {
    let mut rules = Vec::new();
    for item in spec.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (key, param) = match item.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v)),
            None => (item, None),
        };
        let rule = match (RuleKind::from_str(key)?, param) {
            (RuleKind::Required, None) => Rule::Required,
            (RuleKind::UniqueItems, None) => Rule::UniqueItems,
            (RuleKind::EmptyItemsAllowed, None) => Rule::EmptyItemsAllowed,
            (RuleKind::Min, Some(p)) => Rule::Min(parse_f64(key, p)?),
            (RuleKind::Max, Some(p)) => Rule::Max(parse_f64(key, p)?),
            (RuleKind::MultipleOf, Some(p)) => {
                let n = parse_f64(key, p)?;
                if n <= 0.0 {
                    return Err(bad(key, p));
                }
                Rule::MultipleOf(n)
            }
            (RuleKind::MinLength, Some(p)) => Rule::MinLength(parse_usize(key, p)?),
            (RuleKind::MaxLength, Some(p)) => Rule::MaxLength(parse_usize(key, p)?),
            (RuleKind::MinItems, Some(p)) => Rule::MinItems(parse_usize(key, p)?),
            (RuleKind::MaxItems, Some(p)) => Rule::MaxItems(parse_usize(key, p)?),
            (RuleKind::Pattern, Some(p)) => {
                Rule::Pattern(Regex::new(p).map_err(|_| bad(key, p))?)
            }
            (RuleKind::Enum, Some(p)) => {
                if p.is_empty() {
                    return Err(bad(key, p));
                }
                Rule::Enum(p.split('|').map(str::to_string).collect())
            }
            (RuleKind::Format, Some(p)) => match p {
                "email" => Rule::Format(NamedFormat::Email),
                other => return Err(bad(key, other)),
            },
            // bare rule given a parameter, or parameterized rule without one
            (_, Some(p)) => return Err(bad(key, p)),
            (_, None) => return Err(bad(key, "")),
        };
        rules.push(rule);
    }
    Ok(rules)
}

/// Parse a `;`-separated custom-message table, e.g.
/// `"required=Name is mandatory;minlength=Too short"`.
pub fn parse_messages(spec: &str) -> Result<Vec<(RuleKind, String)>, MetadataError> {
    let mut messages = Vec::new();
    for item in spec.split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (key, message) = item.split_once('=').ok_or_else(|| {
            MetadataError::Malformed(format!("message entry `{item}` is not `rule=message`"))
        })?;
        messages.push((RuleKind::from_str(key.trim())?, message.to_string()));
    }
    Ok(messages)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_parameterized_rules() {
        let rules = parse_rules("required,min=18,max=120,uniqueitems").unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].kind(), RuleKind::Required);
        assert!(matches!(rules[1], Rule::Min(n) if n == 18.0));
        assert!(matches!(rules[2], Rule::Max(n) if n == 120.0));
        assert_eq!(rules[3].kind(), RuleKind::UniqueItems);
    }

    #[test]
    fn preserves_declaration_order() {
        let rules = parse_rules("maxlength=5,minlength=2,required").unwrap();
        let kinds: Vec<_> = rules.iter().map(Rule::kind).collect();
        assert_eq!(
            kinds,
            vec![RuleKind::MaxLength, RuleKind::MinLength, RuleKind::Required]
        );
    }

    #[test]
    fn parses_enum_values() {
        let rules = parse_rules("enum=red|green|blue").unwrap();
        assert!(matches!(&rules[0], Rule::Enum(v) if v == &["red", "green", "blue"]));
    }

    #[test]
    fn parses_pattern_and_format() {
        let rules = parse_rules("pattern=^[a-z]+$,format=email").unwrap();
        assert!(matches!(&rules[0], Rule::Pattern(re) if re.is_match("abc")));
        assert!(matches!(rules[1], Rule::Format(NamedFormat::Email)));
    }

    #[test]
    fn tolerates_whitespace_and_empty_items() {
        let rules = parse_rules(" required , min=1 ,, ").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn rejects_unknown_rule() {
        assert_eq!(
            parse_rules("bogus").unwrap_err(),
            MetadataError::UnknownRule("bogus".to_string())
        );
    }

    #[test]
    fn rejects_missing_parameter() {
        assert!(matches!(
            parse_rules("min"),
            Err(MetadataError::BadParameter { .. })
        ));
    }

    #[test]
    fn rejects_parameter_on_bare_rule() {
        assert!(matches!(
            parse_rules("required=yes"),
            Err(MetadataError::BadParameter { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_bounds() {
        assert!(parse_rules("min=abc").is_err());
        assert!(parse_rules("minlength=-1").is_err());
        assert!(parse_rules("maxitems=1.5").is_err());
    }

    #[test]
    fn rejects_non_positive_multipleof() {
        assert!(parse_rules("multipleof=0").is_err());
        assert!(parse_rules("multipleof=-3").is_err());
        assert!(parse_rules("multipleof=3").is_ok());
    }

    #[test]
    fn rejects_invalid_regex() {
        assert!(parse_rules("pattern=[").is_err());
    }

    #[test]
    fn rejects_unknown_format_family() {
        assert!(parse_rules("format=phone").is_err());
    }

    #[test]
    fn parses_message_table() {
        let messages = parse_messages("required=Name is mandatory;minlength=Too short").unwrap();
        assert_eq!(
            messages,
            vec![
                (RuleKind::Required, "Name is mandatory".to_string()),
                (RuleKind::MinLength, "Too short".to_string()),
            ]
        );
    }

    #[test]
    fn message_values_may_contain_equals() {
        let messages = parse_messages("enum=must be one of: a=1, b=2").unwrap();
        assert_eq!(messages[0].1, "must be one of: a=1, b=2");
    }

    #[test]
    fn rejects_message_without_separator() {
        assert!(parse_messages("justtext").is_err());
        assert!(parse_messages("nosuchrule=hi").is_err());
    }

    #[test]
    fn rule_parsing_does_not_depend_on_any_payload() {
        // parsing is the metadata-time boundary; the same spec always
        // yields the same rule list
        let a = parse_rules("required,min=2").unwrap();
        let b = parse_rules("required,min=2").unwrap();
        let ka: Vec<_> = a.iter().map(Rule::kind).collect();
        let kb: Vec<_> = b.iter().map(Rule::kind).collect();
        assert_eq!(ka, kb);
    }
}
