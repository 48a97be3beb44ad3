//! # Authentication Validation Integration Tests
//!
//! Exercises every validation entry point through the public API: requiredness,
//! defaults, coercions, exclusivity and the unknown-field policy.

use gateway_auth_config::auth::{
    validate_basic_authentication, validate_jwt_authentication, validate_local_authentication,
};
use gateway_auth_config::{
    AuthConfigValidator, AuthSource, MiddlewareConfigRef, ValidationError, ValueClass,
    ViolationKind,
};
use serde_json::json;

fn validator() -> AuthConfigValidator {
    AuthConfigValidator::new()
}

#[test]
fn test_jwt_with_secret_succeeds_unchanged() {
    let candidates = [
        json!({"secretOrKey": "s3cret"}),
        json!({"secretOrKey": "s3cret", "issuer": "gateway", "audience": "api"}),
        json!({
            "secretOrKey": "s3cret",
            "algorithms": ["HS256", "HS384"],
            "ignoreExpiration": true,
            "extractFrom": {"authHeader": "Bearer"},
            "verify": "loadUser",
        }),
    ];

    for candidate in candidates {
        let jwt = validate_jwt_authentication(&candidate).unwrap();
        assert_eq!(jwt.secret_or_key, "s3cret");
    }
}

#[test]
fn test_jwt_optional_fields_normalized() {
    let jwt = validate_jwt_authentication(&json!({
        "secretOrKey": "k",
        "issuer": "https://issuer.example",
        "algorithms": ["RS256"],
        "ignoreExpiration": false,
        "extractFrom": {"queryParam": "access_token"},
    }))
    .unwrap();

    assert_eq!(jwt.issuer.as_deref(), Some("https://issuer.example"));
    assert_eq!(jwt.audience, None);
    assert_eq!(jwt.algorithms, Some(vec!["RS256".to_string()]));
    assert_eq!(jwt.ignore_expiration, Some(false));
    assert_eq!(
        jwt.extract_from.and_then(|e| e.query_param),
        Some("access_token".to_string())
    );
    assert!(jwt.verify.is_none());
}

#[test]
fn test_jwt_missing_secret_is_required_violation() {
    let candidates = [
        json!({}),
        json!({"issuer": "gateway"}),
        json!({"secretOrKey": null, "algorithms": ["HS256"]}),
    ];

    for candidate in candidates {
        let err = validate_jwt_authentication(&candidate).unwrap_err();
        assert_eq!(err.schema, "jwtAuthentication");
        assert_eq!(err.violation_at("secretOrKey"), Some(&ViolationKind::Required));
    }
}

#[test]
fn test_jwt_field_types() {
    let err = validate_jwt_authentication(&json!({
        "secretOrKey": 12345,
        "algorithms": "HS256",
        "ignoreExpiration": "yes",
        "audience": ["a"],
    }))
    .unwrap_err();

    assert_eq!(
        err.violation_at("secretOrKey"),
        Some(&ViolationKind::InvalidType {
            expected: "string",
            actual: ValueClass::Number,
        })
    );
    assert_eq!(
        err.violation_at("algorithms"),
        Some(&ViolationKind::InvalidType {
            expected: "array of strings",
            actual: ValueClass::String,
        })
    );
    assert!(err.has("ignoreExpiration", "invalid_type"));
    assert!(err.has("audience", "invalid_type"));
    assert_eq!(err.violations.len(), 4);
}

#[test]
fn test_local_defaults_when_fields_omitted() {
    let candidates = [
        json!({"verify": "verifyUser"}),
        json!({"verify": {"handler": "verifyUser"}}),
        json!({"verify": "verifyUser", "usernameField": null, "passwordField": null}),
    ];

    for candidate in candidates {
        let local = validate_local_authentication(&candidate).unwrap();
        assert_eq!(local.username_field, "username");
        assert_eq!(local.password_field, "password");
    }
}

#[test]
fn test_local_partial_defaults() {
    let local = validate_local_authentication(&json!({
        "verify": "verifyUser",
        "usernameField": "email",
    }))
    .unwrap();

    assert_eq!(local.username_field, "email");
    assert_eq!(local.password_field, "password");
}

#[test]
fn test_basic_and_local_require_verify() {
    let err = validate_basic_authentication(&json!({})).unwrap_err();
    assert_eq!(err.violation_at("verify"), Some(&ViolationKind::Required));

    let err = validate_local_authentication(&json!({"usernameField": "email"})).unwrap_err();
    assert_eq!(err.schema, "localAuthentication");
    assert_eq!(err.violation_at("verify"), Some(&ViolationKind::Required));
}

#[test]
fn test_verify_delegates_to_middleware_validator() {
    let err = validate_basic_authentication(&json!({"verify": 42})).unwrap_err();
    assert!(err.has("verify", "invalid_middleware"));

    let basic = validate_basic_authentication(&json!({"verify": "checkCredentials"})).unwrap();
    assert_eq!(basic.verify, MiddlewareConfigRef::reference("checkCredentials"));
}

#[test]
fn test_api_use_alone_succeeds() {
    let api = validator()
        .validate_api_authentication_config(&json!({"use": "foo"}))
        .unwrap();
    assert_eq!(api.source, AuthSource::Use("foo".to_string()));
    assert!(api.group.is_none());
    assert!(api.applies_to("anything"));
}

#[test]
fn test_api_strategy_alone_succeeds() {
    let api = validator()
        .validate_api_authentication_config(&json!({"strategy": {"name": "passport", "options": {}}}))
        .unwrap();
    assert!(matches!(api.source, AuthSource::Strategy(MiddlewareConfigRef::Inline(_))));
}

#[test]
fn test_api_neither_strategy_nor_use_fails() {
    for candidate in [json!({}), json!({"group": "admins"}), json!({"use": null})] {
        let err = validator()
            .validate_api_authentication_config(&candidate)
            .unwrap_err();
        assert_eq!(
            err.violation_at(""),
            Some(&ViolationKind::ExclusiveNonePresent {
                fields: vec!["strategy", "use"],
            })
        );
    }
}

#[test]
fn test_api_both_strategy_and_use_fails() {
    let err = validator()
        .validate_api_authentication_config(&json!({"strategy": {"name": "passport"}, "use": "foo"}))
        .unwrap_err();

    assert_eq!(
        err.violation_at(""),
        Some(&ViolationKind::ExclusiveBothPresent {
            fields: vec!["strategy", "use"],
        })
    );
    assert!(!err.has("", "exclusive_none"));
}

#[test]
fn test_api_group_string_becomes_list() {
    let api = validator()
        .validate_api_authentication_config(&json!({"use": "foo", "group": "admins"}))
        .unwrap();
    assert_eq!(api.group, Some(vec!["admins".to_string()]));
    assert!(api.applies_to("admins"));
    assert!(!api.applies_to("users"));
}

#[test]
fn test_api_group_list_unchanged() {
    let api = validator()
        .validate_api_authentication_config(&json!({"use": "foo", "group": ["a", "b"]}))
        .unwrap();
    assert_eq!(api.group, Some(vec!["a".to_string(), "b".to_string()]));
}

#[test]
fn test_api_group_with_non_string_member() {
    let err = validator()
        .validate_api_authentication_config(&json!({"use": "foo", "group": ["a", 2]}))
        .unwrap_err();
    assert!(err.has("group[1]", "invalid_type"));
}

#[test]
fn test_api_empty_group_rejected() {
    let err = validator()
        .validate_api_authentication_config(&json!({"use": "a", "group": []}))
        .unwrap_err();
    assert_eq!(err.violation_at("group"), Some(&ViolationKind::Empty));
    assert!(err.has("group", "empty"));
    assert_eq!(err.violations.len(), 1);
}

#[test]
fn test_serialized_error_uses_same_codes_as_logs() {
    let err = validator()
        .validate_api_authentication_config(&json!({}))
        .unwrap_err();
    let json = serde_json::to_value(&err).unwrap();

    assert_eq!(json["schema"], json!("apiAuthenticationConfig"));
    assert_eq!(json["violations"][0]["code"], json!(err.violations[0].kind.code()));
    assert_eq!(json["violations"][0]["code"], json!("exclusive_none"));

    let err = validator()
        .validate_api_authentication_config(&json!({"strategy": "s", "use": "u"}))
        .unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["violations"][0]["code"], json!("exclusive_both"));
}

#[test]
fn test_base_authentication_config_requires_strategy() {
    let config = validator()
        .validate_authentication_config(&json!({"strategy": "passport-jwt"}))
        .unwrap();
    assert_eq!(config.strategy.as_reference(), Some("passport-jwt"));

    let err = validator().validate_authentication_config(&json!({})).unwrap_err();
    assert_eq!(err.schema, "authenticationConfig");
    assert_eq!(err.violation_at("strategy"), Some(&ViolationKind::Required));

    let err = validator()
        .validate_authentication_config(&json!({"strategy": "x", "use": "y"}))
        .unwrap_err();
    assert!(err.has("use", "unknown_field"));
}

#[test]
fn test_extractor_allows_multiple_locations() {
    let extractor = validator()
        .validate_jwt_request_extractor(&json!({"header": "x-api-token", "cookie": "jwt"}))
        .unwrap();
    assert_eq!(extractor.header.as_deref(), Some("x-api-token"));
    assert_eq!(extractor.cookie.as_deref(), Some("jwt"));
    assert_eq!(extractor.locations().len(), 2);

    let all = validator()
        .validate_jwt_request_extractor(&json!({
            "header": "h",
            "queryParam": "q",
            "authHeader": "Bearer",
            "bodyField": "token",
            "cookie": "c",
        }))
        .unwrap();
    assert_eq!(all.locations().len(), 5);

    let none = validator().validate_jwt_request_extractor(&json!({})).unwrap();
    assert!(none.is_empty());
}

fn assert_extra_rejected(err: Option<ValidationError>) {
    let err = err.expect("extra field must be rejected");
    assert_eq!(err.violation_at("extra"), Some(&ViolationKind::UnknownField));
}

#[test]
fn test_unknown_fields_rejected_on_every_shape() {
    let v = validator();

    assert_extra_rejected(v.validate_authentication_config(&json!({"strategy": "s", "extra": 1})).err());
    assert_extra_rejected(v.validate_api_authentication_config(&json!({"use": "s", "extra": 1})).err());
    assert_extra_rejected(v.validate_basic_authentication(&json!({"verify": "v", "extra": 1})).err());
    assert_extra_rejected(v.validate_local_authentication(&json!({"verify": "v", "extra": 1})).err());
    assert_extra_rejected(v.validate_jwt_authentication(&json!({"secretOrKey": "k", "extra": 1})).err());
    assert_extra_rejected(v.validate_jwt_request_extractor(&json!({"cookie": "c", "extra": 1})).err());
}

#[test]
fn test_unknown_field_in_nested_extractor() {
    let err = validate_jwt_authentication(&json!({
        "secretOrKey": "k",
        "extractFrom": {"header": "h", "fromUrl": true},
    }))
    .unwrap_err();
    assert!(err.has("extractFrom.fromUrl", "unknown_field"));
}

#[test]
fn test_non_object_candidates_rejected() {
    for candidate in [json!(null), json!("jwt"), json!([1, 2]), json!(7)] {
        let err = validate_jwt_authentication(&candidate).unwrap_err();
        assert!(err.has("", "not_an_object"));
        assert_eq!(err.violations.len(), 1);
    }
}

#[test]
fn test_error_message_names_schema_and_fields() {
    let err = validate_local_authentication(&json!({"usernameField": 3})).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("localAuthentication validation failed"));
    assert!(message.contains("verify: required field is missing"));
    assert!(message.contains("usernameField: expected string, found number"));
}
