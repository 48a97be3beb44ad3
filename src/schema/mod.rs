//! # Authentication Schemas
//!
//! Declarative rule sets for each authentication shape and the interpreter that
//! evaluates them.

pub mod definitions;
pub mod rules;

pub use definitions::{
    ALL_SCHEMAS, API_AUTHENTICATION_VALIDATOR_SCHEMA, AUTHENTICATION_VALIDATOR_SCHEMA,
    BASIC_AUTHENTICATION_SCHEMA, JWT_AUTHENTICATION_SCHEMA, JWT_REQUEST_EXTRACTOR_SCHEMA,
    LOCAL_AUTHENTICATION_SCHEMA,
};
pub use rules::{FieldKind, FieldRule, Presence, RuleSet, UnknownFieldPolicy};
