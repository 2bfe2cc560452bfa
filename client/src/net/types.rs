//! Wire types for the booking REST API.
//!
//! DESIGN
//! ======
//! Response types are lenient (`#[serde(default)]` on fields some endpoints
//! omit) so the same struct decodes the owner, public and admin projections.
//! Request types skip absent optionals so server-side defaults apply.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

// =============================================================================
// AUTH
// =============================================================================

/// Body of `POST /api/auth/login-json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response of the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The authenticated user's profile from `GET /api/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_login: Option<NaiveDateTime>,
}

impl User {
    /// Full name when known, otherwise the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Body of `POST /api/auth/register`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Body of `POST /api/super-admin/users`; the same fields as self-registration.
pub type UserCreate = RegisterRequest;

/// Body of `PUT /api/admin/profile`. Only present fields are changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// =============================================================================
// TENANTS
// =============================================================================

/// Public booking-page profile of a tenant, as served by `GET /api/tenants/{username}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    pub username: String,
    pub display_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub business_address: Option<String>,
    #[serde(default)]
    pub business_phone: Option<String>,
    #[serde(default)]
    pub business_email: Option<String>,
    #[serde(default = "default_true")]
    pub allow_public_booking: bool,
    #[serde(default)]
    pub booking_lead_time_hours: Option<i64>,
    #[serde(default)]
    pub max_advance_days: Option<i64>,
}

/// A tenant as seen by its owner (or by a super admin, who also sees `owner_id`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub profile: TenantProfile,
}

impl Tenant {
    #[must_use]
    pub fn username(&self) -> &str {
        &self.profile.username
    }
}

/// Body of `POST /api/tenants/`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TenantCreate {
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_public_booking: Option<bool>,
}

/// Body of `PUT /api/tenants/{id}`. Only present fields are changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TenantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_public_booking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_lead_time_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_advance_days: Option<i64>,
}

// =============================================================================
// SLOTS
// =============================================================================

pub const DEFAULT_SLOT_MINUTES: i64 = 60;

/// A slot in the owner's (or admin's) view, including booking details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub datetime: NaiveDateTime,
    #[serde(default = "default_slot_minutes")]
    pub duration_minutes: i64,
    #[serde(default)]
    pub is_booked: bool,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_message: Option<String>,
    #[serde(default)]
    pub booked_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Slot {
    #[must_use]
    pub fn ends_at(&self) -> NaiveDateTime {
        self.datetime + Duration::minutes(self.duration_minutes)
    }
}

/// A bookable slot on a tenant's public page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub id: i64,
    pub datetime: NaiveDateTime,
    #[serde(default = "default_slot_minutes")]
    pub duration_minutes: i64,
}

impl AvailableSlot {
    #[must_use]
    pub fn ends_at(&self) -> NaiveDateTime {
        self.datetime + Duration::minutes(self.duration_minutes)
    }
}

/// Body of `POST /api/tenants/{tenant_id}/slots`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotCreate {
    pub tenant_id: i64,
    pub datetime: NaiveDateTime,
    pub duration_minutes: i64,
}

/// Body of `POST /api/tenants/{username}/slots/{slot_id}/book`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub client_name: String,
    pub client_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_message: Option<String>,
}

/// Server acknowledgement of a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub message: String,
    pub slot_id: i64,
    pub datetime: NaiveDateTime,
    pub tenant_username: String,
}

// =============================================================================
// ADMIN
// =============================================================================

/// Plain `{ "message": ... }` acknowledgement used by delete and toggle endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Platform counters from `GET /api/super-admin/stats`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_users: u64,
    pub admin_users: u64,
    pub total_tenants: u64,
    pub active_tenants: u64,
    pub total_slots: u64,
    pub booked_slots: u64,
    pub available_slots: u64,
}

fn default_true() -> bool {
    true
}

fn default_slot_minutes() -> i64 {
    DEFAULT_SLOT_MINUTES
}
