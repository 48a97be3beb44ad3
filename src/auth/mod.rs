//! # Authentication Configuration
//!
//! The authentication shapes an API gateway accepts and the validator that turns
//! untrusted configuration into them.
//!
//! ## Shapes
//! - [`AuthenticationConfig`]: a bare strategy middleware reference.
//! - [`ApiAuthenticationConfig`]: per-API authentication. Exactly one of an inline
//!   `strategy` or a `use` naming a declared strategy, optionally limited to one or
//!   more request groups.
//! - [`BasicAuthentication`], [`LocalAuthentication`] and [`JwtAuthentication`]:
//!   the strategy kinds, selected in documents by their `type`.
//!
//! ## Validation
//! [`AuthConfigValidator`] evaluates a candidate against the shape's rule set and
//! only then builds the typed value. A rejected candidate yields a
//! [`ValidationError`](crate::ValidationError) listing every violation with its
//! path. The validator holds no mutable state and can be shared across threads.

pub mod config;
pub mod validator;

pub use config::{
    ApiAuthenticationConfig, AuthSource, AuthStrategyKind, AuthenticationConfig,
    BasicAuthentication, ExtractionLocation, JwtAuthentication, JwtRequestExtractor, KeyKind,
    LocalAuthentication, StrategyConfig,
};
pub use validator::{
    validate_basic_authentication, validate_jwt_authentication, validate_local_authentication,
    AuthConfigValidator,
};
