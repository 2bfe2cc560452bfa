//! Scripted transport and fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::nav::Location;
use crate::net::api::ApiClient;
use crate::net::error::TransportError;
use crate::net::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::storage::MemoryTokenStore;

pub const BASE_URL: &str = "http://api.test";

// =========================================================================
// MockTransport
// =========================================================================

/// Replays queued responses in order and records every request it receives.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: u16, body: serde_json::Value) {
        self.push_raw(status, &body.to_string());
    }

    pub fn push_raw(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
    }

    pub fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Request(message.to_owned())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted response".to_owned())))
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub api: Arc<ApiClient>,
    pub transport: Arc<MockTransport>,
    pub tokens: Arc<MemoryTokenStore>,
    pub location: Location,
}

pub fn harness() -> Harness {
    harness_with(MemoryTokenStore::new(), "/")
}

pub fn harness_with(tokens: MemoryTokenStore, path: &str) -> Harness {
    let transport = Arc::new(MockTransport::new());
    let tokens = Arc::new(tokens);
    let location = Location::new(path);
    let api = Arc::new(ApiClient::new(BASE_URL, transport.clone(), tokens.clone(), location.clone()));
    Harness { api, transport, tokens, location }
}

// =========================================================================
// Fixtures
// =========================================================================

pub fn user_json(id: i64, is_admin: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": format!("user{id}@example.com"),
        "first_name": null,
        "last_name": null,
        "is_admin": is_admin,
        "is_active": true,
        "created_at": "2025-03-01T08:00:00",
        "last_login": null
    })
}

pub fn tenant_json(id: i64, username: &str, display_name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "display_name": display_name,
        "email": format!("{username}@example.com"),
        "title": "Terminbuchung",
        "primary_color": "#7F7FFF",
        "allow_public_booking": true,
        "booking_lead_time_hours": 24,
        "max_advance_days": 30,
        "is_active": true,
        "created_at": "2025-03-01T08:00:00",
        "updated_at": "2025-03-01T08:00:00"
    })
}

pub fn slot_json(id: i64, tenant_id: i64, hour: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "tenant_id": tenant_id,
        "datetime": format!("2025-03-14T{hour:02}:00:00"),
        "duration_minutes": 60,
        "is_booked": false,
        "created_at": "2025-03-01T08:00:00"
    })
}

pub fn available_slot_json(id: i64, hour: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "datetime": format!("2025-03-14T{hour:02}:00:00"),
        "duration_minutes": 60
    })
}

pub fn detail(message: &str) -> serde_json::Value {
    serde_json::json!({ "detail": message })
}
