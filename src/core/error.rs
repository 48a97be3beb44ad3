//! # Error Handling Module
//!
//! Error types for authentication configuration validation, built on `thiserror`.
//!
//! ## Error Model
//! - [`ValidationError`] is the only error a validation entry point returns. It names
//!   the shape that was being validated and carries every [`Violation`] found while
//!   evaluating that shape's rule set.
//! - [`Violation`] pairs a dotted field path (`extractFrom.cookie`, `group[1]`) with a
//!   [`ViolationKind`] describing the broken constraint.
//! - [`AuthConfigError`] wraps validation failures together with the I/O and parse
//!   failures the document loader can hit.
//!
//! Validation failures are never transient: the configuration must be fixed, so
//! nothing here is retryable.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for the document loader and CLI
pub type AuthConfigResult<T> = Result<T, AuthConfigError>;

/// The class of a JSON value, used to report what was found instead of what was expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueClass {
    /// Classify a JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Lowercase name used in messages and serialized violations
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The specific constraint a field failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field is missing (or explicitly null)
    #[error("required field is missing")]
    Required,

    /// A field holds a value of the wrong type
    #[error("expected {expected}, found {actual}")]
    InvalidType { expected: &'static str, actual: ValueClass },

    /// A field is not declared by the shape
    #[error("unknown field")]
    UnknownField,

    /// The candidate (or a nested candidate) is not an object at all
    #[error("expected an object, found {actual}")]
    NotAnObject { actual: ValueClass },

    /// A list that must name at least one entry is empty
    #[error("must not be empty")]
    Empty,

    /// More than one field of an exactly-one-of group is present
    #[serde(rename = "exclusive_both")]
    #[error("only one of [{}] may be set", .fields.join(", "))]
    ExclusiveBothPresent { fields: Vec<&'static str> },

    /// No field of an exactly-one-of group is present
    #[serde(rename = "exclusive_none")]
    #[error("exactly one of [{}] must be set", .fields.join(", "))]
    ExclusiveNonePresent { fields: Vec<&'static str> },

    /// The middleware configuration validator rejected a reference
    #[error("invalid middleware configuration: {reason}")]
    InvalidMiddleware { reason: String },

    /// A `use` entry names a strategy the document does not declare
    #[error("unknown strategy '{name}'")]
    UnknownStrategy { name: String },

    /// A strategy declares a `type` that is not basic, local or jwt
    #[error("unknown strategy type '{kind}'")]
    UnknownStrategyKind { kind: String },

    /// The normalized value could not be read back into its typed shape
    #[error("malformed configuration: {reason}")]
    Malformed { reason: String },
}

impl ViolationKind {
    /// Stable machine-readable code for this violation
    ///
    /// This is the same string the `code` field carries when the violation is
    /// serialized, so logs and serialized reports agree.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidType { .. } => "invalid_type",
            Self::UnknownField => "unknown_field",
            Self::NotAnObject { .. } => "not_an_object",
            Self::Empty => "empty",
            Self::ExclusiveBothPresent { .. } => "exclusive_both",
            Self::ExclusiveNonePresent { .. } => "exclusive_none",
            Self::InvalidMiddleware { .. } => "invalid_middleware",
            Self::UnknownStrategy { .. } => "unknown_strategy",
            Self::UnknownStrategyKind { .. } => "unknown_strategy_kind",
            Self::Malformed { .. } => "malformed",
        }
    }
}

/// A single rule violation at a field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path to the offending field; empty for the candidate itself
    pub path: String,

    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl Violation {
    /// Create a violation at `path`, relative to the candidate being evaluated
    pub fn new<S: Into<String>>(path: S, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Re-root this violation under `prefix`
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.path = join_path(prefix, &self.path);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Join a parent path and a child path with a dot, keeping index suffixes attached
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) if path.starts_with('[') => format!("{}{}", prefix, path),
        (false, false) => format!("{}.{}", prefix, path),
    }
}

/// A rejected authentication configuration
///
/// Always carries at least one violation. Entry points return either a fully
/// normalized value or this error, never both.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{schema} validation failed: {}", format_violations(.violations))]
pub struct ValidationError {
    /// Name of the shape that was validated, e.g. `jwtAuthentication`
    pub schema: &'static str,

    /// Every violation found, in evaluation order
    pub violations: Vec<Violation>,
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Create an error from the violations collected for `schema`
    ///
    /// Callers only build this once they know at least one violation exists.
    pub fn new(schema: &'static str, violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { schema, violations }
    }

    /// Create an error with exactly one violation
    pub fn single<S: Into<String>>(schema: &'static str, path: S, kind: ViolationKind) -> Self {
        Self::new(schema, vec![Violation::new(path, kind)])
    }

    /// Find the first violation reported at `path`
    pub fn violation_at(&self, path: &str) -> Option<&ViolationKind> {
        self.violations
            .iter()
            .find(|v| v.path == path)
            .map(|v| &v.kind)
    }

    /// Whether any violation at `path` has the given code
    pub fn has(&self, path: &str, code: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.path == path && v.kind.code() == code)
    }

    /// Re-root every violation under `prefix`
    pub fn prefixed(self, prefix: &str) -> Vec<Violation> {
        self.violations
            .into_iter()
            .map(|v| v.prefixed(prefix))
            .collect()
    }
}

/// Errors from loading and validating an authentication document
#[derive(Debug, Error)]
pub enum AuthConfigError {
    /// The document parsed but failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration-related errors that are not rule violations (bad paths, flags, etc.)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// I/O errors while reading a document
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON parsing errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml { message: String },
}

impl AuthConfigError {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Configuration errors are fixed by editing the configuration, never by retrying
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Get a string representation of the error type for reports
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Yaml { .. } => "yaml_error",
        }
    }

    /// The underlying validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AuthConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AuthConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AuthConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}
