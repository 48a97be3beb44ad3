//! # Authentication Configuration Validator
//!
//! Entry points that take an untrusted candidate (any JSON value) and return either
//! the normalized, typed configuration or a [`ValidationError`].
//!
//! The rule sets are process-wide statics and the validator holds no mutable state,
//! so a single [`AuthConfigValidator`] can be shared freely across threads.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::config::{
    ApiAuthenticationConfig, AuthStrategyKind, AuthenticationConfig, BasicAuthentication,
    JwtAuthentication, JwtRequestExtractor, LocalAuthentication, StrategyConfig,
};
use crate::core::error::{ValidationError, ViolationKind};
use crate::middleware::config::{MiddlewareConfigValidator, OpaqueMiddlewareValidator};
use crate::schema::definitions::{
    API_AUTHENTICATION_VALIDATOR_SCHEMA, AUTHENTICATION_VALIDATOR_SCHEMA,
    BASIC_AUTHENTICATION_SCHEMA, JWT_AUTHENTICATION_SCHEMA, JWT_REQUEST_EXTRACTOR_SCHEMA,
    LOCAL_AUTHENTICATION_SCHEMA,
};
use crate::schema::rules::RuleSet;

/// Validates authentication configuration candidates
#[derive(Debug, Clone)]
pub struct AuthConfigValidator {
    /// Collaborator that decides whether middleware references are valid
    middleware: Arc<dyn MiddlewareConfigValidator>,
}

impl Default for AuthConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfigValidator {
    /// Validator that accepts any middleware reference string or inline object
    pub fn new() -> Self {
        Self::with_middleware_validator(Arc::new(OpaqueMiddlewareValidator))
    }

    pub fn with_middleware_validator(middleware: Arc<dyn MiddlewareConfigValidator>) -> Self {
        Self { middleware }
    }

    fn run<T: DeserializeOwned>(
        &self,
        schema: &'static RuleSet,
        candidate: &Value,
    ) -> Result<T, ValidationError> {
        let normalized = schema
            .evaluate(candidate, self.middleware.as_ref())
            .map_err(|err| {
                warn!(
                    schema = schema.name,
                    violations = err.violations.len(),
                    "Rejected authentication configuration: {}",
                    err
                );
                err
            })?;

        let value = serde_json::from_value(Value::Object(normalized)).map_err(|e| {
            ValidationError::single(
                schema.name,
                "",
                ViolationKind::Malformed {
                    reason: e.to_string(),
                },
            )
        })?;

        debug!(schema = schema.name, "Authentication configuration accepted");
        Ok(value)
    }

    pub fn validate_authentication_config(
        &self,
        candidate: &Value,
    ) -> Result<AuthenticationConfig, ValidationError> {
        self.run(&AUTHENTICATION_VALIDATOR_SCHEMA, candidate)
    }

    /// Exactly one of `strategy` or `use` must be set; a bare `group` string
    /// becomes a one-element list
    pub fn validate_api_authentication_config(
        &self,
        candidate: &Value,
    ) -> Result<ApiAuthenticationConfig, ValidationError> {
        self.run(&API_AUTHENTICATION_VALIDATOR_SCHEMA, candidate)
    }

    pub fn validate_basic_authentication(
        &self,
        candidate: &Value,
    ) -> Result<BasicAuthentication, ValidationError> {
        self.run(&BASIC_AUTHENTICATION_SCHEMA, candidate)
    }

    /// Missing `usernameField`/`passwordField` default to `username`/`password`
    pub fn validate_local_authentication(
        &self,
        candidate: &Value,
    ) -> Result<LocalAuthentication, ValidationError> {
        self.run(&LOCAL_AUTHENTICATION_SCHEMA, candidate)
    }

    pub fn validate_jwt_authentication(
        &self,
        candidate: &Value,
    ) -> Result<JwtAuthentication, ValidationError> {
        let jwt: JwtAuthentication = self.run(&JWT_AUTHENTICATION_SCHEMA, candidate)?;

        // Accepted as-is; the runtime decides what to do with them.
        for name in jwt.unrecognized_algorithms() {
            warn!(algorithm = name, "JWT configuration lists an unrecognized algorithm");
        }

        Ok(jwt)
    }

    pub fn validate_jwt_request_extractor(
        &self,
        candidate: &Value,
    ) -> Result<JwtRequestExtractor, ValidationError> {
        self.run(&JWT_REQUEST_EXTRACTOR_SCHEMA, candidate)
    }

    /// Validate a candidate against the shape selected by `kind`
    pub fn validate_strategy(
        &self,
        kind: AuthStrategyKind,
        candidate: &Value,
    ) -> Result<StrategyConfig, ValidationError> {
        match kind {
            AuthStrategyKind::Basic => self
                .validate_basic_authentication(candidate)
                .map(StrategyConfig::Basic),
            AuthStrategyKind::Local => self
                .validate_local_authentication(candidate)
                .map(StrategyConfig::Local),
            AuthStrategyKind::Jwt => self
                .validate_jwt_authentication(candidate)
                .map(StrategyConfig::Jwt),
        }
    }
}

/// Validate a Local strategy with the default middleware validator
pub fn validate_local_authentication(candidate: &Value) -> Result<LocalAuthentication, ValidationError> {
    AuthConfigValidator::new().validate_local_authentication(candidate)
}

/// Validate a Basic strategy with the default middleware validator
pub fn validate_basic_authentication(candidate: &Value) -> Result<BasicAuthentication, ValidationError> {
    AuthConfigValidator::new().validate_basic_authentication(candidate)
}

/// Validate a JWT strategy with the default middleware validator
pub fn validate_jwt_authentication(candidate: &Value) -> Result<JwtAuthentication, ValidationError> {
    AuthConfigValidator::new().validate_jwt_authentication(candidate)
}
