use super::*;
use crate::storage::{MemoryTokenStore, TokenStore};
use crate::test_helpers::{Harness, detail, harness, harness_with, user_json};

fn store(h: &Harness) -> SessionStore {
    SessionStore::new(h.api.clone())
}

// =============================================================
// SessionState
// =============================================================

#[test]
fn status_is_derived_from_token_user_and_error() {
    let mut state = SessionState::default();
    assert_eq!(state.status(), SessionStatus::Anonymous);
    assert!(!state.is_authenticated());

    state.token = Some("t".into());
    assert_eq!(state.status(), SessionStatus::Initializing);
    assert!(state.is_authenticated());

    state.user = Some(serde_json::from_value(user_json(1, true)).unwrap());
    assert_eq!(state.status(), SessionStatus::Authenticated);
    assert!(state.is_admin());

    state.error = Some("Failed to update profile".into());
    assert_eq!(state.status(), SessionStatus::Error);

    state.token = None;
    state.user = None;
    state.error = Some("Login failed".into());
    assert_eq!(state.status(), SessionStatus::Anonymous);
}

#[test]
fn new_store_picks_up_persisted_token() {
    let h = harness_with(MemoryTokenStore::with_token("persisted"), "/");
    let session = store(&h);
    let state = session.snapshot();
    assert_eq!(state.token.as_deref(), Some("persisted"));
    assert_eq!(state.status(), SessionStatus::Initializing);
}

// =============================================================
// login
// =============================================================

#[tokio::test]
async fn login_success_persists_token_and_loads_user() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = store(&h);
    h.transport.push(200, serde_json::json!({ "access_token": "jwt-1", "token_type": "bearer" }));
    h.transport.push(200, user_json(5, false));

    assert!(session.login("user5@example.com", "pw").await);

    let state = session.snapshot();
    assert_eq!(state.status(), SessionStatus::Authenticated);
    assert_eq!(state.token.as_deref(), Some("jwt-1"));
    assert_eq!(state.user.as_ref().map(|u| u.id), Some(5));
    assert!(!state.loading);
    assert_eq!(h.tokens.get().as_deref(), Some("jwt-1"));

    let requests = h.transport.requests();
    assert_eq!(requests[0].url, "http://api.test/api/auth/login-json");
    assert_eq!(requests[0].header("Authorization"), None);
    assert_eq!(requests[1].url, "http://api.test/api/auth/me");
    assert_eq!(requests[1].header("Authorization"), Some("Bearer jwt-1"));
}

#[tokio::test]
async fn login_success_makes_later_requests_carry_bearer() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = store(&h);
    h.transport.push(200, serde_json::json!({ "access_token": "jwt-2" }));
    h.transport.push(200, user_json(1, false));
    assert!(session.login("a@b.c", "pw").await);

    h.transport.push(200, serde_json::json!([]));
    let _: Vec<serde_json::Value> = h.api.get_json("/tenants/").await.unwrap();
    assert_eq!(h.transport.last_request().header("Authorization"), Some("Bearer jwt-2"));
}

#[tokio::test]
async fn login_failure_uses_server_detail() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = store(&h);
    h.transport.push(401, detail("Incorrect email or password"));

    assert!(!session.login("a@b.c", "wrong").await);

    let state = session.snapshot();
    assert_eq!(state.error.as_deref(), Some("Incorrect email or password"));
    assert_eq!(state.token, None);
    assert_eq!(state.user, None);
    assert!(!state.loading);
    assert_eq!(state.status(), SessionStatus::Anonymous);
    assert_eq!(h.tokens.get(), None);
}

#[tokio::test]
async fn login_failure_without_detail_falls_back() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = store(&h);
    h.transport.push_error("connection refused");

    assert!(!session.login("a@b.c", "pw").await);
    assert_eq!(session.snapshot().error.as_deref(), Some(LOGIN_FAILED));
}

#[tokio::test]
async fn login_clears_previous_error() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = store(&h);
    h.transport.push(500, serde_json::json!({}));
    assert!(!session.login("a@b.c", "pw").await);

    h.transport.push(200, serde_json::json!({ "access_token": "t" }));
    h.transport.push(200, user_json(1, false));
    assert!(session.login("a@b.c", "pw").await);
    assert_eq!(session.snapshot().error, None);
}

#[tokio::test]
async fn overlapping_logins_apply_in_turn() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = Arc::new(store(&h));
    h.transport.push(200, serde_json::json!({ "access_token": "first" }));
    h.transport.push(200, user_json(1, false));
    h.transport.push(200, serde_json::json!({ "access_token": "second" }));
    h.transport.push(200, user_json(2, false));

    let (a, b) = tokio::join!(session.login("a@b.c", "pw"), session.login("b@b.c", "pw"));
    assert!(a && b);

    // Each login's token request is immediately followed by its own profile
    // request, so the final state pairs the second token with the second user.
    let urls: Vec<String> = h.transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "http://api.test/api/auth/login-json",
            "http://api.test/api/auth/me",
            "http://api.test/api/auth/login-json",
            "http://api.test/api/auth/me",
        ]
    );
    let state = session.snapshot();
    assert_eq!(state.token.as_deref(), Some("second"));
    assert_eq!(state.user.map(|u| u.id), Some(2));
    assert!(!state.loading);
}

// =============================================================
// logout / expire
// =============================================================

#[tokio::test]
async fn logout_clears_everything_and_is_idempotent() {
    let h = harness_with(MemoryTokenStore::with_token("t"), "/dashboard");
    let session = store(&h);
    h.api.set_default_token("t");

    session.logout().await;
    let once = session.snapshot();
    session.logout().await;
    let twice = session.snapshot();

    assert_eq!(once, twice);
    assert_eq!(twice.status(), SessionStatus::Anonymous);
    assert_eq!(h.tokens.get(), None);
    assert_eq!(h.api.default_token(), None);
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn logout_after_failed_login_is_anonymous_without_error() {
    let h = harness_with(MemoryTokenStore::new(), "/login");
    let session = store(&h);
    h.transport.push(401, detail("Incorrect email or password"));
    assert!(!session.login("a@b.c", "wrong").await);

    session.logout().await;
    let once = session.snapshot();
    session.logout().await;

    assert_eq!(once.status(), SessionStatus::Anonymous);
    assert_eq!(once.error, None);
    assert_eq!(session.snapshot(), once);
}

#[tokio::test]
async fn expire_resets_to_anonymous() {
    let h = harness_with(MemoryTokenStore::with_token("t"), "/dashboard");
    let session = store(&h);
    session.expire().await;
    assert_eq!(session.snapshot().status(), SessionStatus::Anonymous);
}

// =============================================================
// get_current_user / init
// =============================================================

#[tokio::test]
async fn get_current_user_without_token_is_noop() {
    let h = harness();
    let session = store(&h);
    session.get_current_user().await;
    assert!(h.transport.requests().is_empty());
    assert!(!session.snapshot().loading);
}

#[tokio::test]
async fn get_current_user_401_logs_out() {
    let h = harness_with(MemoryTokenStore::with_token("stale"), "/dashboard");
    let session = store(&h);
    h.transport.push(401, detail("Could not validate credentials"));

    session.get_current_user().await;

    let state = session.snapshot();
    assert_eq!(state.status(), SessionStatus::Anonymous);
    assert_eq!(h.tokens.get(), None);
}

#[tokio::test]
async fn get_current_user_transient_failure_keeps_session() {
    let h = harness_with(MemoryTokenStore::with_token("good"), "/dashboard");
    let session = store(&h);
    h.transport.push(503, detail("Service unavailable"));

    session.get_current_user().await;

    let state = session.snapshot();
    assert_eq!(state.token.as_deref(), Some("good"));
    assert_eq!(state.user, None);
    assert!(!state.loading);
    assert_eq!(h.tokens.get().as_deref(), Some("good"));
}

#[tokio::test]
async fn init_restores_user_from_persisted_token() {
    let h = harness_with(MemoryTokenStore::with_token("persisted"), "/");
    let session = store(&h);
    h.transport.push(200, user_json(9, true));

    session.init().await;

    let state = session.snapshot();
    assert_eq!(state.status(), SessionStatus::Authenticated);
    assert!(state.is_admin());
    assert_eq!(h.api.default_token().as_deref(), Some("persisted"));
    assert_eq!(h.transport.last_request().header("Authorization"), Some("Bearer persisted"));
}

#[tokio::test]
async fn init_without_token_does_nothing() {
    let h = harness();
    let session = store(&h);
    session.init().await;
    assert!(h.transport.requests().is_empty());
    assert_eq!(session.snapshot(), SessionState::default());
}

// =============================================================
// register / update_profile
// =============================================================

#[tokio::test]
async fn register_returns_user_without_logging_in() {
    let h = harness_with(MemoryTokenStore::new(), "/register");
    let session = store(&h);
    h.transport.push(200, user_json(12, false));

    let request = RegisterRequest { email: "new@example.com".into(), password: "pw".into(), ..RegisterRequest::default() };
    let user = session.register(&request).await.unwrap();

    assert_eq!(user.id, 12);
    assert_eq!(session.snapshot().status(), SessionStatus::Anonymous);
    assert_eq!(h.transport.last_request().url, "http://api.test/api/auth/register");
}

#[tokio::test]
async fn register_failure_propagates_and_records_detail() {
    let h = harness_with(MemoryTokenStore::new(), "/register");
    let session = store(&h);
    h.transport.push(400, detail("Email already registered"));

    let err = session.register(&RegisterRequest::default()).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(session.snapshot().error.as_deref(), Some("Email already registered"));
    assert!(!session.snapshot().loading);
}

#[tokio::test]
async fn update_profile_replaces_cached_user() {
    let h = harness_with(MemoryTokenStore::with_token("t"), "/dashboard");
    let session = store(&h);
    let mut updated = user_json(3, false);
    updated["first_name"] = serde_json::json!("Grace");
    h.transport.push(200, updated);

    let update = ProfileUpdate { first_name: Some("Grace".into()), ..ProfileUpdate::default() };
    let user = session.update_profile(&update).await.unwrap();

    assert_eq!(user.display_name(), "Grace");
    assert_eq!(session.snapshot().user, Some(user));
    assert_eq!(h.transport.last_request().method, Method::PUT);
}
