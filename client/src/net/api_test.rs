use super::*;
use crate::storage::MemoryTokenStore;
use crate::test_helpers::{BASE_URL, detail, harness, harness_with, user_json};

// =============================================================
// Endpoint paths
// =============================================================

#[test]
fn endpoint_helpers_format_expected_paths() {
    assert_eq!(tenant_endpoint(3), "/tenants/3");
    assert_eq!(tenant_endpoint("salon-anna"), "/tenants/salon-anna");
    assert_eq!(tenant_slots_endpoint(3), "/tenants/3/slots");
    assert_eq!(book_slot_endpoint("salon-anna", 9), "/tenants/salon-anna/slots/9/book");
    assert_eq!(slot_endpoint(9), "/slots/9");
    assert_eq!(super_admin_endpoint("stats"), "/super-admin/stats");
}

#[test]
fn url_joins_base_prefix_and_path() {
    let h = harness();
    assert_eq!(h.api.url(ME_ENDPOINT), format!("{BASE_URL}/api/auth/me"));
}

// =============================================================
// Bearer injection
// =============================================================

#[tokio::test]
async fn request_without_token_sends_no_authorization() {
    let h = harness();
    h.transport.push(200, serde_json::json!([]));
    let _: Vec<serde_json::Value> = h.api.get_json(TENANTS_ENDPOINT).await.unwrap();
    assert_eq!(h.transport.last_request().header("authorization"), None);
}

#[tokio::test]
async fn request_attaches_persisted_token() {
    let h = harness_with(MemoryTokenStore::with_token("stored"), "/dashboard");
    h.transport.push(200, user_json(1, false));
    let _: serde_json::Value = h.api.get_json(ME_ENDPOINT).await.unwrap();
    let req = h.transport.last_request();
    assert_eq!(req.header("Authorization"), Some("Bearer stored"));
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.url, "http://api.test/api/auth/me");
}

#[tokio::test]
async fn persisted_token_wins_over_default_token() {
    let h = harness_with(MemoryTokenStore::with_token("stored"), "/");
    h.api.set_default_token("default");
    h.transport.push(200, serde_json::json!({}));
    let _: serde_json::Value = h.api.get_json(ME_ENDPOINT).await.unwrap();
    assert_eq!(h.transport.last_request().header("Authorization"), Some("Bearer stored"));
}

#[tokio::test]
async fn default_token_used_when_store_empty() {
    let h = harness();
    h.api.set_default_token("default");
    h.transport.push(200, serde_json::json!({}));
    let _: serde_json::Value = h.api.get_json(ME_ENDPOINT).await.unwrap();
    assert_eq!(h.transport.last_request().header("Authorization"), Some("Bearer default"));

    h.api.clear_default_token();
    h.transport.push(200, serde_json::json!({}));
    let _: serde_json::Value = h.api.get_json(ME_ENDPOINT).await.unwrap();
    assert_eq!(h.transport.last_request().header("Authorization"), None);
}

#[tokio::test]
async fn send_json_sets_content_type_and_body() {
    let h = harness();
    h.transport.push(200, serde_json::json!({ "access_token": "t" }));
    let body = serde_json::json!({ "email": "a@b.c", "password": "pw" });
    let _: serde_json::Value = h.api.send_json(Method::POST, LOGIN_ENDPOINT, &body).await.unwrap();
    let req = h.transport.last_request();
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(serde_json::from_str::<serde_json::Value>(req.body.as_deref().unwrap()).unwrap(), body);
}

// =============================================================
// 401 interception
// =============================================================

#[tokio::test]
async fn unauthorized_off_auth_page_clears_token_and_emits_event() {
    let h = harness_with(MemoryTokenStore::with_token("expired"), "/dashboard");
    let mut events = h.api.subscribe();
    h.transport.push(401, detail("Could not validate credentials"));

    let err = h.api.get_json::<serde_json::Value>(TENANTS_ENDPOINT).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.tokens.get(), None);
    assert_eq!(
        events.try_recv().unwrap(),
        ApiEvent::SessionExpired { path: TENANTS_ENDPOINT.to_owned() }
    );
}

#[tokio::test]
async fn unauthorized_on_login_page_leaves_token_and_stays_quiet() {
    let h = harness_with(MemoryTokenStore::with_token("kept"), "/login");
    let mut events = h.api.subscribe();
    h.transport.push(401, detail("Incorrect email or password"));

    let err = h.api.get_json::<serde_json::Value>(ME_ENDPOINT).await.unwrap_err();

    assert_eq!(err.detail(), Some("Incorrect email or password"));
    assert_eq!(h.tokens.get().as_deref(), Some("kept"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn unauthorized_on_register_page_leaves_token() {
    let h = harness_with(MemoryTokenStore::with_token("kept"), "/register");
    h.transport.push(401, detail("nope"));
    let _ = h.api.get_json::<serde_json::Value>(ME_ENDPOINT).await;
    assert_eq!(h.tokens.get().as_deref(), Some("kept"));
}

#[tokio::test]
async fn other_failures_pass_through_untouched() {
    let h = harness_with(MemoryTokenStore::with_token("kept"), "/dashboard");
    let mut events = h.api.subscribe();
    h.transport.push(403, detail("Not enough permissions"));

    let err = h.api.get_json::<serde_json::Value>(TENANTS_ENDPOINT).await.unwrap_err();

    assert_eq!(err, ApiError::Server { status: 403, detail: Some("Not enough permissions".into()) });
    assert_eq!(h.tokens.get().as_deref(), Some("kept"));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn transport_failure_maps_to_transport_error() {
    let h = harness();
    h.transport.push_error("connection refused");
    let err = h.api.get_json::<serde_json::Value>(ME_ENDPOINT).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Request(_))));
}

#[tokio::test]
async fn undecodable_success_body_is_decode_error() {
    let h = harness();
    h.transport.push_raw(200, "<html>");
    let err = h.api.get_json::<serde_json::Value>(ME_ENDPOINT).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn delete_ignores_response_body() {
    let h = harness();
    h.transport.push_raw(204, "");
    h.api.delete(&slot_endpoint(4)).await.unwrap();
    let req = h.transport.last_request();
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.url, "http://api.test/api/slots/4");
}
