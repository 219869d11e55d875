// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Schema registries: named sets of scalar-resolution rules.
//!
//! A schema is a flattened, ordered list of `(tag, kind, constructor)` rules.
//! Composition is by inheritance - a schema includes all rules of its parent
//! with its own rules tested first - and the flattening happens once at
//! registry construction, not per lookup. The three registries form a chain:
//!
//! - **Failsafe**: structural rules only (`!!str`, `!!seq`, `!!map`).
//! - **Core**: failsafe plus strict implicit literals for null, bool,
//!   decimal int and float.
//! - **Default**: core plus the YAML 1.1 extended literals (`0x`/`0o`/`0b`
//!   bases, `_` digit separators, `.inf`/`.nan`) and merge-key support.
//!
//! Implicit resolution never fails: the fallback guarantees a `String`.

use std::sync::OnceLock;

use crate::value::{NodeKind, Value};

/// Well-known tag prefix for the YAML core types.
const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Names the schema registry to use for a parse invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Structural rules only; every scalar stays a string.
    Failsafe,
    /// Strict null/bool/int/float literals.
    Core,
    /// Core plus YAML 1.1 extended literals and merge keys.
    Default,
}

impl Default for SchemaKind {
    fn default() -> Self {
        Self::Default
    }
}

impl SchemaKind {
    /// The flattened registry for this kind. Registries are immutable and
    /// shared across all parse invocations.
    pub(crate) fn registry(self) -> &'static Schema {
        static FAILSAFE: OnceLock<Schema> = OnceLock::new();
        static CORE: OnceLock<Schema> = OnceLock::new();
        static DEFAULT: OnceLock<Schema> = OnceLock::new();
        match self {
            Self::Failsafe => FAILSAFE.get_or_init(Schema::failsafe),
            Self::Core => CORE.get_or_init(Schema::core),
            Self::Default => DEFAULT.get_or_init(Schema::default_registry),
        }
    }
}

/// One scalar-resolution rule.
///
/// `construct` doubles as predicate and constructor: it returns `None` when
/// the literal does not match the rule, `Some(value)` when it does.
/// Structural rules (`!!seq`, `!!map`) have no constructor; they only
/// participate in explicit-tag kind checking.
pub(crate) struct Rule {
    pub tag: &'static str,
    pub kind: NodeKind,
    pub construct: Option<fn(&str) -> Option<Value>>,
    /// Whether the rule participates in implicit (pattern) resolution.
    pub implicit: bool,
}

/// A flattened schema registry.
pub(crate) struct Schema {
    pub name: &'static str,
    rules: Vec<Rule>,
    /// Whether the `<<` merge key is active under this schema.
    pub merge_keys: bool,
}

impl Schema {
    fn failsafe() -> Self {
        Self {
            name: "failsafe",
            rules: failsafe_rules(),
            merge_keys: false,
        }
    }

    fn core() -> Self {
        // Child rules first, then the parent's.
        let mut rules = core_rules();
        rules.extend(failsafe_rules());
        Self {
            name: "core",
            rules,
            merge_keys: false,
        }
    }

    fn default_registry() -> Self {
        let mut rules = extended_rules();
        rules.extend(core_rules());
        rules.extend(failsafe_rules());
        Self {
            name: "default",
            rules,
            merge_keys: true,
        }
    }

    /// Resolve a scalar literal by testing implicit rules in priority order.
    ///
    /// Never fails: the fallback keeps the literal as a plain string.
    pub fn resolve_implicit(&self, literal: &str) -> Value {
        self.resolve_implicit_tagged(literal).0
    }

    /// Like [`Schema::resolve_implicit`], but also reports the tag of the
    /// matching rule. `None` means the string fallback applied. The loader
    /// uses the tag to recognize merge keys.
    pub fn resolve_implicit_tagged(&self, literal: &str) -> (Value, Option<&'static str>) {
        for rule in &self.rules {
            if rule.implicit
                && let Some(construct) = rule.construct
                && let Some(value) = construct(literal)
            {
                return (value, Some(rule.tag));
            }
        }
        (Value::String(literal.to_owned()), None)
    }

    /// Look up the first rule registered for `tag`.
    pub fn rule(&self, tag: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.tag == tag)
    }
}

fn failsafe_rules() -> Vec<Rule> {
    vec![
        Rule {
            tag: "tag:yaml.org,2002:str",
            kind: NodeKind::Scalar,
            construct: Some(|literal| Some(Value::String(literal.to_owned()))),
            implicit: false,
        },
        Rule {
            tag: "tag:yaml.org,2002:seq",
            kind: NodeKind::Sequence,
            construct: None,
            implicit: false,
        },
        Rule {
            tag: "tag:yaml.org,2002:map",
            kind: NodeKind::Mapping,
            construct: None,
            implicit: false,
        },
    ]
}

fn core_rules() -> Vec<Rule> {
    vec![
        Rule {
            tag: "tag:yaml.org,2002:null",
            kind: NodeKind::Scalar,
            construct: Some(construct_null),
            implicit: true,
        },
        Rule {
            tag: "tag:yaml.org,2002:bool",
            kind: NodeKind::Scalar,
            construct: Some(construct_bool),
            implicit: true,
        },
        Rule {
            tag: "tag:yaml.org,2002:int",
            kind: NodeKind::Scalar,
            construct: Some(construct_int_decimal),
            implicit: true,
        },
        Rule {
            tag: "tag:yaml.org,2002:float",
            kind: NodeKind::Scalar,
            construct: Some(construct_float_decimal),
            implicit: true,
        },
    ]
}

fn extended_rules() -> Vec<Rule> {
    vec![
        Rule {
            tag: "tag:yaml.org,2002:int",
            kind: NodeKind::Scalar,
            construct: Some(construct_int_extended),
            implicit: true,
        },
        Rule {
            tag: "tag:yaml.org,2002:float",
            kind: NodeKind::Scalar,
            construct: Some(construct_float_extended),
            implicit: true,
        },
        Rule {
            tag: "tag:yaml.org,2002:merge",
            kind: NodeKind::Scalar,
            construct: Some(|literal| {
                (literal == "<<").then(|| Value::String("<<".to_owned()))
            }),
            implicit: true,
        },
    ]
}

fn construct_null(literal: &str) -> Option<Value> {
    matches!(literal, "" | "~" | "null" | "Null" | "NULL").then_some(Value::Null)
}

fn construct_bool(literal: &str) -> Option<Value> {
    match literal {
        "true" | "True" | "TRUE" => Some(Value::Bool(true)),
        "false" | "False" | "FALSE" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn split_sign(literal: &str) -> (bool, &str) {
    if let Some(rest) = literal.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = literal.strip_prefix('+') {
        (false, rest)
    } else {
        (false, literal)
    }
}

fn construct_int_decimal(literal: &str) -> Option<Value> {
    let (_, digits) = split_sign(literal);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    literal.parse::<i64>().ok().map(Value::Int)
}

/// Strict float: sign, digits with at most one `.`, optional exponent. A `.`
/// or exponent must be present so integers keep their own rule.
fn construct_float_decimal(literal: &str) -> Option<Value> {
    let (_, body) = split_sign(literal);
    if body.is_empty() {
        return None;
    }
    let mut saw_dot = false;
    let mut saw_exp = false;
    let mut saw_digit = false;
    let mut prev_was_exp = false;
    for (i, ch) in body.char_indices() {
        match ch {
            '0'..='9' => saw_digit = true,
            '.' if !saw_dot && !saw_exp => saw_dot = true,
            'e' | 'E' if !saw_exp && saw_digit => {
                saw_exp = true;
                prev_was_exp = true;
                continue;
            }
            '-' | '+' if prev_was_exp && i > 0 => {}
            _ => return None,
        }
        prev_was_exp = false;
    }
    if !saw_digit || (!saw_dot && !saw_exp) {
        return None;
    }
    literal.parse::<f64>().ok().map(Value::Float)
}

fn construct_int_extended(literal: &str) -> Option<Value> {
    let (negative, body) = split_sign(literal);
    if body.is_empty() {
        return None;
    }
    if body.starts_with('_') || body.ends_with('_') {
        return None;
    }
    let cleaned: String = body.chars().filter(|&ch| ch != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    let (radix, digits) = if let Some(rest) = cleaned.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = cleaned.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = cleaned.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, cleaned.as_str())
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(Value::Int(if negative { -magnitude } else { magnitude }))
}

fn construct_float_extended(literal: &str) -> Option<Value> {
    let (negative, body) = split_sign(literal);
    match body {
        ".inf" | ".Inf" | ".INF" => {
            let inf = if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            return Some(Value::Float(inf));
        }
        ".nan" | ".NaN" | ".NAN" => return Some(Value::Float(f64::NAN)),
        _ => {}
    }
    if body.contains('_') {
        let cleaned: String = literal.chars().filter(|&ch| ch != '_').collect();
        return construct_float_decimal(&cleaned);
    }
    construct_float_decimal(literal)
}

/// Normalize a tag as written in the source to its full form.
///
/// `!!suffix` is the secondary handle and expands to the YAML tag namespace;
/// everything else is already full (verbatim tags, `%TAG`-expanded handles)
/// or local (`!suffix`).
pub(crate) fn expand_secondary_handle(suffix: &str) -> String {
    format!("{YAML_TAG_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_registry() -> &'static Schema {
        SchemaKind::Default.registry()
    }

    #[test]
    fn test_implicit_core_literals() {
        let schema = SchemaKind::Core.registry();
        assert_eq!(schema.resolve_implicit("null"), Value::Null);
        assert_eq!(schema.resolve_implicit("~"), Value::Null);
        assert_eq!(schema.resolve_implicit(""), Value::Null);
        assert_eq!(schema.resolve_implicit("true"), Value::Bool(true));
        assert_eq!(schema.resolve_implicit("FALSE"), Value::Bool(false));
        assert_eq!(schema.resolve_implicit("42"), Value::Int(42));
        assert_eq!(schema.resolve_implicit("-17"), Value::Int(-17));
        assert_eq!(schema.resolve_implicit("3.14"), Value::Float(3.14));
        assert_eq!(schema.resolve_implicit("1e3"), Value::Float(1000.0));
    }

    #[test]
    fn test_implicit_fallback_is_string() {
        let schema = SchemaKind::Core.registry();
        assert_eq!(
            schema.resolve_implicit("hello"),
            Value::String("hello".to_owned())
        );
        // Things that look almost numeric stay strings.
        assert_eq!(
            schema.resolve_implicit("1.2.3"),
            Value::String("1.2.3".to_owned())
        );
        assert_eq!(schema.resolve_implicit("12a"), Value::String("12a".to_owned()));
    }

    #[test]
    fn test_failsafe_resolves_everything_as_string() {
        let schema = SchemaKind::Failsafe.registry();
        assert_eq!(schema.resolve_implicit("42"), Value::String("42".to_owned()));
        assert_eq!(
            schema.resolve_implicit("true"),
            Value::String("true".to_owned())
        );
    }

    #[test]
    fn test_extended_int_bases() {
        let schema = default_registry();
        assert_eq!(schema.resolve_implicit("0x1A"), Value::Int(26));
        assert_eq!(schema.resolve_implicit("0o17"), Value::Int(15));
        assert_eq!(schema.resolve_implicit("0b101"), Value::Int(5));
        assert_eq!(schema.resolve_implicit("1_000_000"), Value::Int(1_000_000));
        assert_eq!(schema.resolve_implicit("-0x10"), Value::Int(-16));
        // Core does not know the extended forms.
        let core = SchemaKind::Core.registry();
        assert_eq!(
            core.resolve_implicit("0x1A"),
            Value::String("0x1A".to_owned())
        );
    }

    #[test]
    fn test_extended_float_literals() {
        let schema = default_registry();
        assert_eq!(schema.resolve_implicit(".inf"), Value::Float(f64::INFINITY));
        assert_eq!(
            schema.resolve_implicit("-.Inf"),
            Value::Float(f64::NEG_INFINITY)
        );
        assert!(matches!(
            schema.resolve_implicit(".nan"),
            Value::Float(x) if x.is_nan()
        ));
        assert_eq!(schema.resolve_implicit("1_0.5"), Value::Float(10.5));
    }

    #[test]
    fn test_child_rules_shadow_parent_rules() {
        // The default registry's extended int rule is consulted before the
        // core one; both carry the same tag.
        let schema = default_registry();
        let rule = schema.rule("tag:yaml.org,2002:int").unwrap();
        assert!(rule.implicit);
        let construct = rule.construct.unwrap();
        assert_eq!(construct("0x10"), Some(Value::Int(16)));
    }

    #[test]
    fn test_explicit_rule_lookup() {
        let schema = default_registry();
        assert!(schema.rule("tag:yaml.org,2002:str").is_some());
        assert!(schema.rule("tag:yaml.org,2002:seq").is_some());
        assert!(schema.rule("tag:example.com,2000:custom").is_none());
        assert_eq!(
            expand_secondary_handle("int"),
            "tag:yaml.org,2002:int"
        );
    }

    #[test]
    fn test_merge_literal_keeps_its_tag() {
        let schema = default_registry();
        let (value, tag) = schema.resolve_implicit_tagged("<<");
        assert_eq!(value, Value::String("<<".to_owned()));
        assert_eq!(tag, Some("tag:yaml.org,2002:merge"));
        // The core registry has no merge rule.
        let (_, tag) = SchemaKind::Core.registry().resolve_implicit_tagged("<<");
        assert_eq!(tag, None);
    }

    #[test]
    fn test_merge_key_only_in_default() {
        assert!(SchemaKind::Default.registry().merge_keys);
        assert!(!SchemaKind::Core.registry().merge_keys);
        assert!(!SchemaKind::Failsafe.registry().merge_keys);
    }
}
