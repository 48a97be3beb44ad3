//! # Rule Sets
//!
//! A rule set is plain data: the fields a shape declares, the constraint on each
//! field, the exactly-one-of groups that tie fields together, and what to do with
//! keys the shape does not declare. [`RuleSet::evaluate`] is the single interpreter
//! for every shape.
//!
//! Evaluation never stops at the first bad field. Every violation in the candidate
//! (nested shapes included) is collected, and the candidate is rejected if any were
//! found. On success the returned object is the normalized configuration: defaults
//! filled in, single strings promoted to lists, middleware references in the form
//! the middleware validator returned.
//!
//! An explicit `null` counts as absent everywhere.
//!
//! ## Field kinds
//! - `String` / `Boolean`: the JSON type must match exactly; nothing is coerced.
//! - `StringList`: an array whose members are all strings. Bad members are
//!   reported individually as `field[i]`.
//! - `StringOrStringList`: a bare string is promoted to a one-element list. An
//!   empty list is rejected, since a field of this kind selects something and an
//!   empty selection would silently match nothing.
//! - `Middleware`: handed to the [`MiddlewareConfigValidator`] as-is.
//! - `Nested`: evaluated by the nested rule set, with paths rooted at the field.

use serde_json::{Map, Value};

use crate::core::error::{join_path, ValidationError, ValueClass, Violation, ViolationKind};
use crate::middleware::config::MiddlewareConfigValidator;

/// What to do with keys a shape does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Report each one as an `unknown_field` violation
    Reject,
    /// Drop them from the normalized value
    Strip,
}

/// Whether a field must appear in the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent or null is a `required` violation
    Required,
    /// Absent or null is left out of the normalized value
    Optional,
    /// Optional; filled with this string when absent
    Default(&'static str),
}

/// The type constraint on a field's value
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    Boolean,
    /// An array of strings, possibly empty
    StringList,
    /// A string or a non-empty list of strings, normalized to a list
    StringOrStringList,
    /// A middleware configuration reference, checked by the middleware validator
    Middleware,
    /// An object evaluated against another rule set
    Nested(&'static RuleSet),
}

impl FieldKind {
    fn expected(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::StringList => "array of strings",
            Self::StringOrStringList => "string or array of strings",
            Self::Middleware => "middleware configuration",
            Self::Nested(_) => "object",
        }
    }
}

/// One declared field of a shape
///
/// Rules are built with the `const` constructors so rule sets can live in
/// `static`s:
///
/// ```
/// use gateway_auth_config::schema::{FieldKind, FieldRule, Presence};
///
/// const VERIFY: FieldRule = FieldRule::required("verify", FieldKind::Middleware);
/// const FIELD: FieldRule = FieldRule::defaulted("usernameField", "username");
///
/// assert_eq!(VERIFY.presence, Presence::Required);
/// assert_eq!(FIELD.presence, Presence::Default("username"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Key in the candidate object, as written in configuration
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldRule {
    /// A field that must be present and non-null
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    /// A field that may be absent
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    /// An optional string field filled with `default` when absent
    pub const fn defaulted(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            presence: Presence::Default(default),
        }
    }
}

/// The declarative description of one configuration shape
#[derive(Debug)]
pub struct RuleSet {
    /// Shape name reported in validation errors
    pub name: &'static str,
    /// Declared fields, evaluated in this order
    pub fields: &'static [FieldRule],
    /// Groups of fields of which exactly one must be present
    pub exactly_one_of: &'static [&'static [&'static str]],
    /// Policy for keys not listed in `fields`
    pub unknown_fields: UnknownFieldPolicy,
}

impl RuleSet {
    /// The rule declared for `name`, if any
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    /// Evaluate a raw candidate against this rule set
    ///
    /// Returns the normalized object, or every violation found. Paths in the
    /// error are relative to the candidate.
    pub fn evaluate(
        &self,
        candidate: &Value,
        middleware: &dyn MiddlewareConfigValidator,
    ) -> Result<Map<String, Value>, ValidationError> {
        let mut violations = Vec::new();
        let normalized = self.evaluate_at("", candidate, middleware, &mut violations);

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError::new(self.name, violations))
        }
    }

    fn evaluate_at(
        &self,
        path: &str,
        candidate: &Value,
        middleware: &dyn MiddlewareConfigValidator,
        violations: &mut Vec<Violation>,
    ) -> Map<String, Value> {
        let mut normalized = Map::new();

        let object = match candidate {
            Value::Object(object) => object,
            other => {
                violations.push(Violation::new(
                    path,
                    ViolationKind::NotAnObject {
                        actual: ValueClass::of(other),
                    },
                ));
                return normalized;
            }
        };

        if self.unknown_fields == UnknownFieldPolicy::Reject {
            for key in object.keys().filter(|key| self.field(key).is_none()) {
                violations.push(Violation::new(join_path(path, key), ViolationKind::UnknownField));
            }
        }

        for rule in self.fields {
            let field_path = join_path(path, rule.name);

            match present(object, rule.name) {
                Some(value) => {
                    if let Some(value) = check_field(rule, &field_path, value, middleware, violations) {
                        normalized.insert(rule.name.to_string(), value);
                    }
                }
                None => match rule.presence {
                    Presence::Required => {
                        violations.push(Violation::new(field_path, ViolationKind::Required));
                    }
                    Presence::Default(default) => {
                        normalized.insert(rule.name.to_string(), Value::String(default.to_string()));
                    }
                    Presence::Optional => {}
                },
            }
        }

        for group in self.exactly_one_of {
            let present_count = group
                .iter()
                .filter(|name| present(object, name).is_some())
                .count();

            match present_count {
                1 => {}
                0 => violations.push(Violation::new(
                    path,
                    ViolationKind::ExclusiveNonePresent {
                        fields: group.to_vec(),
                    },
                )),
                _ => violations.push(Violation::new(
                    path,
                    ViolationKind::ExclusiveBothPresent {
                        fields: group.to_vec(),
                    },
                )),
            }
        }

        normalized
    }
}

fn present<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

fn invalid_type(path: &str, kind: &FieldKind, value: &Value) -> Violation {
    Violation::new(
        path,
        ViolationKind::InvalidType {
            expected: kind.expected(),
            actual: ValueClass::of(value),
        },
    )
}

fn check_field(
    rule: &FieldRule,
    path: &str,
    value: &Value,
    middleware: &dyn MiddlewareConfigValidator,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    match (&rule.kind, value) {
        (FieldKind::String, Value::String(_)) | (FieldKind::Boolean, Value::Bool(_)) => {
            Some(value.clone())
        }
        (FieldKind::StringOrStringList, Value::String(single)) => {
            Some(Value::Array(vec![Value::String(single.clone())]))
        }
        (FieldKind::StringOrStringList, Value::Array(items)) if items.is_empty() => {
            violations.push(Violation::new(path, ViolationKind::Empty));
            None
        }
        (FieldKind::StringList | FieldKind::StringOrStringList, Value::Array(items)) => {
            let before = violations.len();
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    violations.push(invalid_type(
                        &join_path(path, &format!("[{}]", index)),
                        &FieldKind::String,
                        item,
                    ));
                }
            }
            (violations.len() == before).then(|| value.clone())
        }
        (FieldKind::Middleware, _) => match middleware.validate(value) {
            Ok(reference) => Some(reference.into_value()),
            Err(reason) => {
                violations.push(Violation::new(path, ViolationKind::InvalidMiddleware { reason }));
                None
            }
        },
        (FieldKind::Nested(rules), Value::Object(_)) => Some(Value::Object(
            rules.evaluate_at(path, value, middleware, violations),
        )),
        (kind, _) => {
            violations.push(invalid_type(path, kind, value));
            None
        }
    }
}
