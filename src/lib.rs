//! # Gateway Authentication Configuration
//!
//! Defines and validates the configuration shapes an API gateway uses to describe
//! how incoming requests are authenticated. Operators write a strategy type plus
//! strategy-specific options; this crate checks the description and hands back a
//! normalized, typed value before the gateway wires up runtime authentication.
//!
//! Nothing here authenticates a request. There is no credential checking, no token
//! signing and no I/O outside the document loader.
//!
//! ## Shapes
//! - [`AuthenticationConfig`]: `{ strategy }`
//! - [`ApiAuthenticationConfig`]: exactly one of `strategy` / `use`, optional `group`
//! - [`BasicAuthentication`], [`LocalAuthentication`], [`JwtAuthentication`]
//!
//! ## Example
//! ```
//! use gateway_auth_config::AuthConfigValidator;
//! use serde_json::json;
//!
//! let validator = AuthConfigValidator::new();
//! let local = validator
//!     .validate_local_authentication(&json!({ "verify": "checkPassword" }))
//!     .unwrap();
//! assert_eq!(local.username_field, "username");
//! ```

/// Error types shared by every validation entry point
pub mod core;

/// Declarative rule sets and their interpreter
pub mod schema;

/// Middleware configuration references and the validator collaborator
pub mod middleware;

/// Typed authentication shapes and validation entry points
pub mod auth;

/// Whole-document loading and validation
pub mod loader;

pub use auth::{
    ApiAuthenticationConfig, AuthConfigValidator, AuthSource, AuthStrategyKind,
    AuthenticationConfig, BasicAuthentication, JwtAuthentication, JwtRequestExtractor,
    LocalAuthentication, StrategyConfig,
};
pub use self::core::error::{
    AuthConfigError, AuthConfigResult, ValidationError, ValueClass, Violation, ViolationKind,
};
pub use loader::{AuthDocument, ValidatedDocument};
pub use middleware::config::{
    MiddlewareConfigRef, MiddlewareConfigValidator, OpaqueMiddlewareValidator,
    RegisteredMiddlewareValidator,
};
