//! # Authentication Document Loading
//!
//! Reads a whole authentication document and validates every entry in it:
//!
//! ```yaml
//! strategies:
//!   api-token:
//!     type: jwt
//!     secretOrKey: change-me
//!     extractFrom: { authHeader: Bearer }
//! authentication:
//!   - use: api-token
//!     group: internal
//!   - strategy: anonymous
//! ```
//!
//! Each strategy's `type` selects the shape its remaining fields are checked
//! against. Every `use` must name a declared strategy. Violations from all entries
//! are reported together, with paths rooted at the document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::auth::config::{ApiAuthenticationConfig, AuthSource, AuthStrategyKind, StrategyConfig};
use crate::auth::validator::AuthConfigValidator;
use crate::core::error::{
    AuthConfigError, AuthConfigResult, ValidationError, ValueClass, Violation, ViolationKind,
};

const DOCUMENT_SCHEMA: &str = "authenticationDocument";
const STRATEGY_TYPE_FIELD: &str = "type";

/// An authentication document as written, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthDocument {
    /// Named strategies; each carries a `type` discriminator
    #[serde(default)]
    pub strategies: BTreeMap<String, Value>,

    /// Per-API authentication entries
    #[serde(default)]
    pub authentication: Vec<Value>,
}

/// A fully validated authentication document
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    pub strategies: BTreeMap<String, StrategyConfig>,
    pub authentication: Vec<ApiAuthenticationConfig>,
}

impl ValidatedDocument {
    /// Entries that apply to requests in `group`
    pub fn entries_for_group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a ApiAuthenticationConfig> + 'a {
        self.authentication
            .iter()
            .filter(move |entry| entry.applies_to(group))
    }

    /// The declared strategy an entry refers to by name
    pub fn resolve(&self, entry: &ApiAuthenticationConfig) -> Option<&StrategyConfig> {
        entry.use_name().and_then(|name| self.strategies.get(name))
    }
}

impl AuthDocument {
    pub fn from_yaml_str(content: &str) -> AuthConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> AuthConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a document, choosing the format by file extension (`.json`, else YAML)
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> AuthConfigResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AuthConfigError::Io {
                message: format!("Failed to read {}: {}", path.display(), e),
            }
        })?;

        debug!(path = %path.display(), "Read authentication document");

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Validate every strategy and authentication entry
    pub fn validate(&self, validator: &AuthConfigValidator) -> Result<ValidatedDocument, ValidationError> {
        let mut violations = Vec::new();
        let mut strategies = BTreeMap::new();
        let mut authentication = Vec::with_capacity(self.authentication.len());

        for (name, raw) in &self.strategies {
            let path = format!("strategies.{}", name);
            match validate_strategy_entry(validator, raw) {
                Ok(strategy) => {
                    strategies.insert(name.clone(), strategy);
                }
                Err(entry_violations) => violations.extend(
                    entry_violations.into_iter().map(|v| v.prefixed(&path)),
                ),
            }
        }

        for (index, raw) in self.authentication.iter().enumerate() {
            let path = format!("authentication[{}]", index);
            match validator.validate_api_authentication_config(raw) {
                Ok(entry) => {
                    if let AuthSource::Use(name) = &entry.source {
                        if !self.strategies.contains_key(name) {
                            violations.push(Violation::new(
                                format!("{}.use", path),
                                ViolationKind::UnknownStrategy { name: name.clone() },
                            ));
                        }
                    }
                    authentication.push(entry);
                }
                Err(err) => violations.extend(err.prefixed(&path)),
            }
        }

        if !violations.is_empty() {
            return Err(ValidationError::new(DOCUMENT_SCHEMA, violations));
        }

        info!(
            strategies = strategies.len(),
            entries = authentication.len(),
            "Authentication document validated"
        );

        Ok(ValidatedDocument {
            strategies,
            authentication,
        })
    }
}

/// Split off the `type` discriminator and validate the rest against that kind
fn validate_strategy_entry(
    validator: &AuthConfigValidator,
    raw: &Value,
) -> Result<StrategyConfig, Vec<Violation>> {
    let object = match raw {
        Value::Object(object) => object,
        other => {
            return Err(vec![Violation::new(
                "",
                ViolationKind::NotAnObject {
                    actual: ValueClass::of(other),
                },
            )])
        }
    };

    let kind = match object.get(STRATEGY_TYPE_FIELD) {
        None | Some(Value::Null) => {
            return Err(vec![Violation::new(STRATEGY_TYPE_FIELD, ViolationKind::Required)])
        }
        Some(Value::String(kind)) => kind.parse::<AuthStrategyKind>().map_err(|_| {
            vec![Violation::new(
                STRATEGY_TYPE_FIELD,
                ViolationKind::UnknownStrategyKind { kind: kind.clone() },
            )]
        })?,
        Some(other) => {
            return Err(vec![Violation::new(
                STRATEGY_TYPE_FIELD,
                ViolationKind::InvalidType {
                    expected: "string",
                    actual: ValueClass::of(other),
                },
            )])
        }
    };

    let options: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| key.as_str() != STRATEGY_TYPE_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    validator
        .validate_strategy(kind, &Value::Object(options))
        .map_err(|err| err.violations)
}

/// Load and validate a document in one step
pub async fn load_and_validate<P: AsRef<Path>>(
    path: P,
    validator: &AuthConfigValidator,
) -> AuthConfigResult<ValidatedDocument> {
    let document = AuthDocument::load_from_file(path).await?;
    Ok(document.validate(validator)?)
}
