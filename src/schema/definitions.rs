//! Rule sets for every authentication configuration shape.
//!
//! Field names are the camelCase keys operators write in configuration files.

use super::rules::{FieldKind, FieldRule, RuleSet, UnknownFieldPolicy};

/// Request field read for the username when `usernameField` is not set
pub const DEFAULT_USERNAME_FIELD: &str = "username";
/// Request field read for the password when `passwordField` is not set
pub const DEFAULT_PASSWORD_FIELD: &str = "password";

/// Where a JWT may be read from. Any combination of locations is allowed.
pub static JWT_REQUEST_EXTRACTOR_SCHEMA: RuleSet = RuleSet {
    name: "jwtRequestExtractor",
    fields: &[
        FieldRule::optional("header", FieldKind::String),
        FieldRule::optional("queryParam", FieldKind::String),
        FieldRule::optional("authHeader", FieldKind::String),
        FieldRule::optional("bodyField", FieldKind::String),
        FieldRule::optional("cookie", FieldKind::String),
    ],
    exactly_one_of: &[],
    unknown_fields: UnknownFieldPolicy::Reject,
};

pub static JWT_AUTHENTICATION_SCHEMA: RuleSet = RuleSet {
    name: "jwtAuthentication",
    fields: &[
        FieldRule::required("secretOrKey", FieldKind::String),
        FieldRule::optional("extractFrom", FieldKind::Nested(&JWT_REQUEST_EXTRACTOR_SCHEMA)),
        FieldRule::optional("issuer", FieldKind::String),
        FieldRule::optional("audience", FieldKind::String),
        FieldRule::optional("algorithms", FieldKind::StringList),
        FieldRule::optional("ignoreExpiration", FieldKind::Boolean),
        FieldRule::optional("verify", FieldKind::Middleware),
    ],
    exactly_one_of: &[],
    unknown_fields: UnknownFieldPolicy::Reject,
};

pub static BASIC_AUTHENTICATION_SCHEMA: RuleSet = RuleSet {
    name: "basicAuthentication",
    fields: &[FieldRule::required("verify", FieldKind::Middleware)],
    exactly_one_of: &[],
    unknown_fields: UnknownFieldPolicy::Reject,
};

pub static LOCAL_AUTHENTICATION_SCHEMA: RuleSet = RuleSet {
    name: "localAuthentication",
    fields: &[
        FieldRule::required("verify", FieldKind::Middleware),
        FieldRule::defaulted("usernameField", DEFAULT_USERNAME_FIELD),
        FieldRule::defaulted("passwordField", DEFAULT_PASSWORD_FIELD),
    ],
    exactly_one_of: &[],
    unknown_fields: UnknownFieldPolicy::Reject,
};

pub static AUTHENTICATION_VALIDATOR_SCHEMA: RuleSet = RuleSet {
    name: "authenticationConfig",
    fields: &[FieldRule::required("strategy", FieldKind::Middleware)],
    exactly_one_of: &[],
    unknown_fields: UnknownFieldPolicy::Reject,
};

/// The base shape's `strategy` becomes optional here; the exactly-one-of group
/// with `use` takes over its requiredness.
pub static API_AUTHENTICATION_VALIDATOR_SCHEMA: RuleSet = RuleSet {
    name: "apiAuthenticationConfig",
    fields: &[
        FieldRule::optional("strategy", FieldKind::Middleware),
        FieldRule::optional("group", FieldKind::StringOrStringList),
        FieldRule::optional("use", FieldKind::String),
    ],
    exactly_one_of: &[&["strategy", "use"]],
    unknown_fields: UnknownFieldPolicy::Reject,
};

/// All shapes, for tooling that lists what can be validated
pub static ALL_SCHEMAS: [&RuleSet; 6] = [
    &AUTHENTICATION_VALIDATOR_SCHEMA,
    &API_AUTHENTICATION_VALIDATOR_SCHEMA,
    &BASIC_AUTHENTICATION_SCHEMA,
    &LOCAL_AUTHENTICATION_SCHEMA,
    &JWT_AUTHENTICATION_SCHEMA,
    &JWT_REQUEST_EXTRACTOR_SCHEMA,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::rules::Presence;

    #[test]
    fn test_every_shape_rejects_unknown_fields() {
        for schema in ALL_SCHEMAS {
            assert_eq!(schema.unknown_fields, UnknownFieldPolicy::Reject, "{}", schema.name);
        }
    }

    #[test]
    fn test_verify_requiredness_differs_per_shape() {
        let presence = |schema: &RuleSet| schema.field("verify").map(|rule| rule.presence);

        assert_eq!(presence(&BASIC_AUTHENTICATION_SCHEMA), Some(Presence::Required));
        assert_eq!(presence(&LOCAL_AUTHENTICATION_SCHEMA), Some(Presence::Required));
        assert_eq!(presence(&JWT_AUTHENTICATION_SCHEMA), Some(Presence::Optional));
    }

    #[test]
    fn test_api_shape_extends_base_fields() {
        for rule in AUTHENTICATION_VALIDATOR_SCHEMA.fields {
            assert!(API_AUTHENTICATION_VALIDATOR_SCHEMA.field(rule.name).is_some());
        }
    }
}
