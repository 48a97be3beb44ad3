//! # Middleware Configuration References
//!
//! Authentication shapes point at middleware (a `verify` callback, a `strategy`
//! implementation) without describing it. The reference is either the name of a
//! middleware registered elsewhere in the gateway or an inline definition object.
//!
//! This crate never interprets a reference. Whether one is structurally valid is
//! decided by a [`MiddlewareConfigValidator`], the collaborator the gateway's own
//! middleware configuration layer provides.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

use crate::core::error::ValueClass;

/// A reference to an externally-defined middleware configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MiddlewareConfigRef {
    /// Name of a middleware registered with the gateway
    Reference(String),

    /// Inline middleware definition, passed through untouched
    Inline(Map<String, Value>),
}

impl MiddlewareConfigRef {
    /// A by-name reference
    pub fn reference<S: Into<String>>(name: S) -> Self {
        Self::Reference(name.into())
    }

    /// The referenced middleware name, if this is a by-name reference
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Self::Reference(name) => Some(name),
            Self::Inline(_) => None,
        }
    }

    /// The JSON form this reference was written in
    pub fn into_value(self) -> Value {
        match self {
            Self::Reference(name) => Value::String(name),
            Self::Inline(map) => Value::Object(map),
        }
    }
}

impl fmt::Display for MiddlewareConfigRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(name) => write!(f, "{}", name),
            Self::Inline(_) => write!(f, "<inline middleware>"),
        }
    }
}

/// Validates middleware configuration references on behalf of the authentication rules
///
/// Implementations return the reference in the form that should be handed onward,
/// or a human-readable reason for rejecting it.
pub trait MiddlewareConfigValidator: Send + Sync + fmt::Debug {
    /// Check one reference; the `Err` text becomes an `invalid_middleware` reason
    fn validate(&self, value: &Value) -> Result<MiddlewareConfigRef, String>;
}

/// Accepts any reference string or inline definition object without looking inside
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueMiddlewareValidator;

impl MiddlewareConfigValidator for OpaqueMiddlewareValidator {
    fn validate(&self, value: &Value) -> Result<MiddlewareConfigRef, String> {
        match value {
            Value::String(name) => Ok(MiddlewareConfigRef::Reference(name.clone())),
            Value::Object(map) => Ok(MiddlewareConfigRef::Inline(map.clone())),
            other => Err(format!(
                "expected a middleware name or inline definition, found {}",
                ValueClass::of(other)
            )),
        }
    }
}

/// Accepts by-name references only when the name is registered
///
/// Inline definitions are passed through; the middleware factory validates them
/// when it builds the middleware.
#[derive(Debug, Clone, Default)]
pub struct RegisteredMiddlewareValidator {
    names: HashSet<String>,
}

impl RegisteredMiddlewareValidator {
    /// A validator that knows exactly the given middleware names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Make another middleware name resolvable
    pub fn register<S: Into<String>>(&mut self, name: S) {
        self.names.insert(name.into());
    }

    /// Whether `name` was registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

impl MiddlewareConfigValidator for RegisteredMiddlewareValidator {
    fn validate(&self, value: &Value) -> Result<MiddlewareConfigRef, String> {
        match OpaqueMiddlewareValidator.validate(value)? {
            MiddlewareConfigRef::Reference(name) if !self.is_registered(&name) => {
                Err(format!("middleware '{}' is not registered", name))
            }
            reference => Ok(reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_opaque_validator_accepts_names_and_objects() {
        let validator = OpaqueMiddlewareValidator;

        assert_eq!(
            validator.validate(&json!("verifyUser")).unwrap(),
            MiddlewareConfigRef::reference("verifyUser")
        );

        let inline = validator
            .validate(&json!({"name": "verify", "config": {"table": "users"}}))
            .unwrap();
        assert!(inline.as_reference().is_none());
        assert_eq!(
            inline.into_value(),
            json!({"name": "verify", "config": {"table": "users"}})
        );
    }

    #[test]
    fn test_opaque_validator_rejects_other_values() {
        let validator = OpaqueMiddlewareValidator;
        let reason = validator.validate(&json!(42)).unwrap_err();
        assert!(reason.contains("found number"));
        assert!(validator.validate(&json!(["a"])).is_err());
        assert!(validator.validate(&json!(true)).is_err());
    }

    #[test]
    fn test_registered_validator() {
        let mut validator = RegisteredMiddlewareValidator::new(["verifyUser"]);
        validator.register("checkToken");

        assert!(validator.validate(&json!("verifyUser")).is_ok());
        assert!(validator.validate(&json!("checkToken")).is_ok());
        assert!(validator.validate(&json!({"inline": true})).is_ok());

        let reason = validator.validate(&json!("missing")).unwrap_err();
        assert_eq!(reason, "middleware 'missing' is not registered");
    }

    #[test]
    fn test_reference_deserializes_untagged() {
        let by_name: MiddlewareConfigRef = serde_json::from_value(json!("verify")).unwrap();
        assert_eq!(by_name.as_reference(), Some("verify"));

        let inline: MiddlewareConfigRef = serde_json::from_value(json!({"a": 1})).unwrap();
        assert!(matches!(inline, MiddlewareConfigRef::Inline(_)));
    }
}
