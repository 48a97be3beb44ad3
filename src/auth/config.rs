//! # Authentication Configuration Shapes
//!
//! Typed, normalized authentication configuration. The usual way to obtain these
//! values is the validator in [`crate::auth::validator`]: the raw candidate is
//! checked against its rule set first, so defaults are already applied, `group` is
//! already a list, and every violation is reported at once.
//!
//! The `Deserialize` impls follow the same policy when used directly. Unknown
//! fields are rejected, `usernameField`/`passwordField` fall back to their
//! defaults, `strategy`/`use` are mutually exclusive and an empty `group` list is
//! refused. Direct deserialization stops at the first problem and reports it as a
//! plain serde error, so configuration tooling should go through the validator.

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::middleware::config::MiddlewareConfigRef;
use crate::schema::definitions::{DEFAULT_PASSWORD_FIELD, DEFAULT_USERNAME_FIELD};

/// Generic strategy reference: `{ strategy }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthenticationConfig {
    pub strategy: MiddlewareConfigRef,
}

/// Where an API's authentication comes from
#[derive(Debug, Clone, PartialEq)]
pub enum AuthSource {
    /// An inline or by-reference strategy middleware
    Strategy(MiddlewareConfigRef),
    /// The name of a strategy declared elsewhere in the configuration
    Use(String),
}

/// Authentication applied to an API, optionally restricted to request groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawApiAuthenticationConfig", into = "RawApiAuthenticationConfig")]
pub struct ApiAuthenticationConfig {
    /// `None` applies the strategy to every request group
    pub group: Option<Vec<String>>,
    pub source: AuthSource,
}

impl ApiAuthenticationConfig {
    /// An entry for every group that refers to the declared strategy `name`
    pub fn using<S: Into<String>>(name: S) -> Self {
        Self {
            group: None,
            source: AuthSource::Use(name.into()),
        }
    }

    /// An entry for every group that runs `strategy` directly
    pub fn with_strategy(strategy: MiddlewareConfigRef) -> Self {
        Self {
            group: None,
            source: AuthSource::Strategy(strategy),
        }
    }

    /// The strategy middleware, when this entry does not refer to one by name
    pub fn strategy(&self) -> Option<&MiddlewareConfigRef> {
        match &self.source {
            AuthSource::Strategy(strategy) => Some(strategy),
            AuthSource::Use(_) => None,
        }
    }

    /// The referenced strategy name, when this entry has one
    pub fn use_name(&self) -> Option<&str> {
        match &self.source {
            AuthSource::Use(name) => Some(name),
            AuthSource::Strategy(_) => None,
        }
    }

    /// Whether this entry covers requests in `group`
    pub fn applies_to(&self, group: &str) -> bool {
        match &self.group {
            None => true,
            Some(groups) => groups.iter().any(|g| g == group),
        }
    }
}

/// Wire form of [`ApiAuthenticationConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawApiAuthenticationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strategy: Option<MiddlewareConfigRef>,
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    use_name: Option<String>,
}

impl TryFrom<RawApiAuthenticationConfig> for ApiAuthenticationConfig {
    type Error = String;

    fn try_from(raw: RawApiAuthenticationConfig) -> Result<Self, Self::Error> {
        let source = match (raw.strategy, raw.use_name) {
            (Some(strategy), None) => AuthSource::Strategy(strategy),
            (None, Some(name)) => AuthSource::Use(name),
            (Some(_), Some(_)) => return Err("only one of strategy or use may be set".to_string()),
            (None, None) => return Err("exactly one of strategy or use must be set".to_string()),
        };

        if raw.group.as_ref().is_some_and(Vec::is_empty) {
            return Err("group must not be empty".to_string());
        }

        Ok(Self {
            group: raw.group,
            source,
        })
    }
}

impl From<ApiAuthenticationConfig> for RawApiAuthenticationConfig {
    fn from(config: ApiAuthenticationConfig) -> Self {
        let (strategy, use_name) = match config.source {
            AuthSource::Strategy(strategy) => (Some(strategy), None),
            AuthSource::Use(name) => (None, Some(name)),
        };

        Self {
            group: config.group,
            strategy,
            use_name,
        }
    }
}

/// HTTP Basic authentication
///
/// `verify` receives `(userid, password, done)` and reports through `done` an
/// error, the authenticated user, or no match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuthentication {
    /// Credential check middleware
    pub verify: MiddlewareConfigRef,
}

/// Username/password authentication read from request fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalAuthentication {
    /// Same completion contract as [`BasicAuthentication::verify`]
    pub verify: MiddlewareConfigRef,
    /// Request field holding the username
    #[serde(default = "default_username_field")]
    pub username_field: String,
    /// Request field holding the password
    #[serde(default = "default_password_field")]
    pub password_field: String,
}

fn default_username_field() -> String {
    DEFAULT_USERNAME_FIELD.to_string()
}

fn default_password_field() -> String {
    DEFAULT_PASSWORD_FIELD.to_string()
}

/// JSON Web Token authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JwtAuthentication {
    /// Symmetric secret or PEM-encoded public key, depending on `algorithms`
    pub secret_or_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_from: Option<JwtRequestExtractor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_expiration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<MiddlewareConfigRef>,
}

/// How `secretOrKey` is interpreted, derived from the configured algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// No recognised algorithm configured
    Unspecified,
    /// HMAC family: `secretOrKey` is a shared secret
    Symmetric,
    /// RSA, RSA-PSS, ECDSA or EdDSA: `secretOrKey` is a PEM public key
    Asymmetric,
    /// Both families configured
    Mixed,
}

fn is_symmetric(algorithm: Algorithm) -> bool {
    matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

impl JwtAuthentication {
    /// A configuration with only the key set
    pub fn new<S: Into<String>>(secret_or_key: S) -> Self {
        Self {
            secret_or_key: secret_or_key.into(),
            extract_from: None,
            issuer: None,
            audience: None,
            algorithms: None,
            ignore_expiration: None,
            verify: None,
        }
    }

    /// Configured algorithms that parse as JWS algorithm names
    pub fn recognized_algorithms(&self) -> Vec<Algorithm> {
        self.algorithms
            .iter()
            .flatten()
            .filter_map(|name| Algorithm::from_str(name).ok())
            .collect()
    }

    /// Configured algorithm names that are not JWS algorithms
    pub fn unrecognized_algorithms(&self) -> Vec<&str> {
        self.algorithms
            .iter()
            .flatten()
            .filter(|name| Algorithm::from_str(name).is_err())
            .map(String::as_str)
            .collect()
    }

    /// How the runtime should interpret `secretOrKey`
    pub fn key_kind(&self) -> KeyKind {
        let algorithms = self.recognized_algorithms();
        let symmetric = algorithms.iter().any(|a| is_symmetric(*a));
        let asymmetric = algorithms.iter().any(|a| !is_symmetric(*a));

        match (symmetric, asymmetric) {
            (false, false) => KeyKind::Unspecified,
            (true, false) => KeyKind::Symmetric,
            (false, true) => KeyKind::Asymmetric,
            (true, true) => KeyKind::Mixed,
        }
    }

    /// Whether expired tokens are accepted; `false` unless configured
    pub fn ignores_expiration(&self) -> bool {
        self.ignore_expiration.unwrap_or(false)
    }
}

/// Request locations a JWT may be read from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JwtRequestExtractor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

/// One configured extraction location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionLocation<'a> {
    Header(&'a str),
    QueryParam(&'a str),
    AuthHeader(&'a str),
    BodyField(&'a str),
    Cookie(&'a str),
}

impl JwtRequestExtractor {
    /// Configured locations, in the order a runtime extractor would try them
    pub fn locations(&self) -> Vec<ExtractionLocation<'_>> {
        let mut locations = Vec::new();
        if let Some(name) = &self.auth_header {
            locations.push(ExtractionLocation::AuthHeader(name));
        }
        if let Some(name) = &self.header {
            locations.push(ExtractionLocation::Header(name));
        }
        if let Some(name) = &self.query_param {
            locations.push(ExtractionLocation::QueryParam(name));
        }
        if let Some(name) = &self.body_field {
            locations.push(ExtractionLocation::BodyField(name));
        }
        if let Some(name) = &self.cookie {
            locations.push(ExtractionLocation::Cookie(name));
        }
        locations
    }

    /// No location configured
    pub fn is_empty(&self) -> bool {
        self.locations().is_empty()
    }
}

/// The strategy kinds a configuration entry can select
///
/// Parsed case-insensitively from a strategy's `type` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStrategyKind {
    Basic,
    Local,
    Jwt,
}

impl AuthStrategyKind {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Local => "local",
            Self::Jwt => "jwt",
        }
    }
}

impl fmt::Display for AuthStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "local" => Ok(Self::Local),
            "jwt" => Ok(Self::Jwt),
            other => Err(format!("unknown strategy type '{}'", other)),
        }
    }
}

/// A validated strategy configuration of any kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StrategyConfig {
    Basic(BasicAuthentication),
    Local(LocalAuthentication),
    Jwt(JwtAuthentication),
}

impl StrategyConfig {
    /// Which strategy shape this configuration holds
    pub fn kind(&self) -> AuthStrategyKind {
        match self {
            Self::Basic(_) => AuthStrategyKind::Basic,
            Self::Local(_) => AuthStrategyKind::Local,
            Self::Jwt(_) => AuthStrategyKind::Jwt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_config_group_matching() {
        let everyone = ApiAuthenticationConfig::using("jwt");
        assert!(everyone.applies_to("admins"));
        assert!(everyone.applies_to(""));

        let admins = ApiAuthenticationConfig {
            group: Some(vec!["admins".to_string(), "ops".to_string()]),
            source: AuthSource::Use("jwt".to_string()),
        };
        assert!(admins.applies_to("ops"));
        assert!(!admins.applies_to("users"));
    }

    #[test]
    fn test_api_config_wire_form() {
        let config = ApiAuthenticationConfig::using("local");
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"use": "local"}));
        assert_eq!(config.use_name(), Some("local"));
        assert!(config.strategy().is_none());

        let config = ApiAuthenticationConfig::with_strategy(MiddlewareConfigRef::reference("passport"));
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"strategy": "passport"}));
    }

    #[test]
    fn test_api_config_typed_form_cannot_hold_both() {
        let both: Result<ApiAuthenticationConfig, _> =
            serde_json::from_value(json!({"strategy": "a", "use": "b"}));
        assert!(both.is_err());

        let neither: Result<ApiAuthenticationConfig, _> = serde_json::from_value(json!({}));
        assert!(neither.is_err());
    }

    #[test]
    fn test_direct_deserialization_applies_defaults() {
        let local: LocalAuthentication = serde_json::from_value(json!({"verify": "check"})).unwrap();
        assert_eq!(local.username_field, "username");
        assert_eq!(local.password_field, "password");

        let local: LocalAuthentication =
            serde_json::from_value(json!({"verify": "check", "passwordField": "secret"})).unwrap();
        assert_eq!(local.username_field, "username");
        assert_eq!(local.password_field, "secret");
    }

    #[test]
    fn test_direct_deserialization_rejects_unknown_fields() {
        assert!(serde_json::from_value::<AuthenticationConfig>(json!({"strategy": "s", "extra": 1})).is_err());
        assert!(serde_json::from_value::<ApiAuthenticationConfig>(json!({"use": "s", "extra": 1})).is_err());
        assert!(serde_json::from_value::<BasicAuthentication>(json!({"verify": "v", "extra": 1})).is_err());
        assert!(serde_json::from_value::<LocalAuthentication>(json!({"verify": "v", "extra": 1})).is_err());
        assert!(serde_json::from_value::<JwtAuthentication>(json!({"secretOrKey": "k", "extra": 1})).is_err());
        assert!(serde_json::from_value::<JwtAuthentication>(json!({
            "secretOrKey": "k",
            "extractFrom": {"fromUrl": true},
        }))
        .is_err());
    }

    #[test]
    fn test_direct_deserialization_rejects_empty_group() {
        let empty: Result<ApiAuthenticationConfig, _> =
            serde_json::from_value(json!({"use": "a", "group": []}));
        assert!(empty.is_err());

        let listed: ApiAuthenticationConfig =
            serde_json::from_value(json!({"use": "a", "group": ["web"]})).unwrap();
        assert!(listed.applies_to("web"));
    }

    #[test]
    fn test_key_kind_from_algorithms() {
        let mut jwt = JwtAuthentication::new("secret");
        assert_eq!(jwt.key_kind(), KeyKind::Unspecified);

        jwt.algorithms = Some(vec!["HS256".to_string(), "HS512".to_string()]);
        assert_eq!(jwt.key_kind(), KeyKind::Symmetric);

        jwt.algorithms = Some(vec!["RS256".to_string(), "ES256".to_string(), "EdDSA".to_string()]);
        assert_eq!(jwt.key_kind(), KeyKind::Asymmetric);

        jwt.algorithms = Some(vec!["HS256".to_string(), "PS384".to_string()]);
        assert_eq!(jwt.key_kind(), KeyKind::Mixed);
    }

    #[test]
    fn test_unrecognized_algorithms() {
        let mut jwt = JwtAuthentication::new("secret");
        jwt.algorithms = Some(vec!["HS256".to_string(), "none".to_string(), "hs256".to_string()]);

        assert_eq!(jwt.unrecognized_algorithms(), vec!["none", "hs256"]);
        assert_eq!(jwt.key_kind(), KeyKind::Symmetric);
        assert!(!jwt.ignores_expiration());
    }

    #[test]
    fn test_extractor_locations() {
        let extractor = JwtRequestExtractor {
            header: Some("x-token".to_string()),
            cookie: Some("session".to_string()),
            auth_header: Some("Bearer".to_string()),
            ..Default::default()
        };

        assert_eq!(
            extractor.locations(),
            vec![
                ExtractionLocation::AuthHeader("Bearer"),
                ExtractionLocation::Header("x-token"),
                ExtractionLocation::Cookie("session"),
            ]
        );
        assert!(JwtRequestExtractor::default().is_empty());
    }

    #[test]
    fn test_strategy_kind_parsing() {
        assert_eq!("JWT".parse::<AuthStrategyKind>().unwrap(), AuthStrategyKind::Jwt);
        assert_eq!("basic".parse::<AuthStrategyKind>().unwrap(), AuthStrategyKind::Basic);
        assert_eq!("Local".parse::<AuthStrategyKind>().unwrap(), AuthStrategyKind::Local);
        assert!("oauth2".parse::<AuthStrategyKind>().is_err());
        assert_eq!(AuthStrategyKind::Jwt.to_string(), "jwt");
    }
}
