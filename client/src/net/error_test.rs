use super::*;

#[test]
fn from_status_401_is_unauthorized_with_detail() {
    let err = ApiError::from_status(401, r#"{"detail":"Incorrect email or password"}"#);
    assert!(err.is_unauthorized());
    assert_eq!(err.detail(), Some("Incorrect email or password"));
    assert_eq!(err.status(), Some(401));
}

#[test]
fn from_status_other_codes_are_server_errors() {
    let err = ApiError::from_status(404, r#"{"detail":"Tenant not found"}"#);
    assert_eq!(err, ApiError::Server { status: 404, detail: Some("Tenant not found".to_owned()) });
}

#[test]
fn user_message_prefers_detail() {
    let err = ApiError::from_status(400, r#"{"detail":"Slot already booked"}"#);
    assert_eq!(err.user_message("Failed to book slot"), "Slot already booked");
}

#[test]
fn user_message_falls_back_without_detail() {
    let err = ApiError::from_status(500, "Internal Server Error");
    assert_eq!(err.user_message("Failed to book slot"), "Failed to book slot");

    let err = ApiError::Transport(TransportError::Request("connection refused".into()));
    assert_eq!(err.user_message("Login failed"), "Login failed");
}

#[test]
fn parse_detail_flattens_validation_lists() {
    let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"},{"msg":"field required"}]}"#;
    assert_eq!(
        parse_detail(body).as_deref(),
        Some("value is not a valid email address; field required")
    );
}

#[test]
fn parse_detail_ignores_empty_and_non_string_values() {
    assert_eq!(parse_detail(r#"{"detail":""}"#), None);
    assert_eq!(parse_detail(r#"{"detail":42}"#), None);
    assert_eq!(parse_detail(r#"{"detail":[]}"#), None);
    assert_eq!(parse_detail(r#"{"message":"nope"}"#), None);
    assert_eq!(parse_detail("not json"), None);
}

#[test]
fn display_includes_status_and_detail() {
    let err = ApiError::Server { status: 422, detail: None };
    assert_eq!(err.to_string(), "server returned 422: no detail");
    let err = ApiError::Unauthorized { detail: Some("Could not validate credentials".into()) };
    assert_eq!(err.to_string(), "unauthorized: Could not validate credentials");
}
