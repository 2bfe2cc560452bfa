//! HTTP client wrapper for the booking REST API.
//!
//! Every call resolves the bearer credential, sends through the injected
//! [`HttpTransport`], and maps non-success statuses to [`ApiError`].
//!
//! ERROR HANDLING
//! ==============
//! A 401 received while the user is not on an auth page clears the persisted
//! token and broadcasts [`ApiEvent::SessionExpired`]. The caller still gets
//! `Err(ApiError::Unauthorized)`; navigation is left to whoever observes the
//! event (see `nav::Router::on_api_event`).

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use super::error::{ApiError, TransportError};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
use crate::config::ClientConfig;
use crate::nav::Location;
use crate::storage::TokenStore;

pub const API_PREFIX: &str = "/api";
const EVENT_CAPACITY: usize = 16;

/// Out-of-band notifications raised while handling responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiEvent {
    /// A request was rejected with 401; the persisted token has been cleared.
    SessionExpired {
        /// API path of the rejected request.
        path: String,
    },
}

pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    location: Location,
    default_token: RwLock<Option<String>>,
    events: broadcast::Sender<ApiEvent>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenStore>,
        location: Location,
    ) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            transport,
            tokens,
            location,
            default_token: RwLock::new(None),
            events,
        }
    }

    /// Build a client backed by [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        location: Location,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeouts.request(), config.timeouts.connect())?;
        Ok(Self::new(config.base_url.clone(), Arc::new(transport), tokens, location))
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ApiEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Set the credential used when the token store is empty.
    pub fn set_default_token(&self, token: &str) {
        *self.default_token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    pub fn clear_default_token(&self) {
        *self.default_token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn default_token(&self) -> Option<String> {
        self.default_token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The persisted token wins over the default credential.
    fn bearer(&self) -> Option<String> {
        self.tokens.get().or_else(|| self.default_token())
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Send one request to `/api{path}`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrives, and
    /// [`ApiError::Unauthorized`] / [`ApiError::Server`] for non-success statuses.
    pub async fn request(&self, method: Method, path: &str, body: Option<String>) -> Result<HttpResponse, ApiError> {
        let mut headers = vec![("Accept".to_owned(), "application/json".to_owned())];
        if body.is_some() {
            headers.push(("Content-Type".to_owned(), "application/json".to_owned()));
        }
        if let Some(token) = self.bearer() {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }

        tracing::debug!(%method, path, "api request");
        let request = HttpRequest { method, url: self.url(path), headers, body };
        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let err = ApiError::from_status(response.status, &response.body);
        if err.is_unauthorized() {
            self.handle_unauthorized(path);
        }
        Err(err)
    }

    fn handle_unauthorized(&self, path: &str) {
        if self.location.is_auth_page() {
            tracing::debug!(path, "401 on auth page; session left untouched");
            return;
        }
        tracing::warn!(path, "401 from api; clearing persisted token");
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        if self.events.send(ApiEvent::SessionExpired { path: path.to_owned() }).is_err() {
            tracing::debug!("no api event subscribers");
        }
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::Decode`] for unexpected bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, None).await?;
        decode(&response)
    }

    /// Send `body` as JSON and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::Encode`] / [`ApiError::Decode`].
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        let response = self.request(method, path, Some(body)).await?;
        decode(&response)
    }

    /// Bodiless request whose JSON response is decoded.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; also [`ApiError::Decode`].
    pub async fn send_empty<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiError> {
        let response = self.request(method, path, None).await?;
        decode(&response)
    }

    /// `DELETE` whose response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

// =============================================================================
// ENDPOINTS
// =============================================================================

pub(crate) const LOGIN_ENDPOINT: &str = "/auth/login-json";
pub(crate) const ME_ENDPOINT: &str = "/auth/me";
pub(crate) const REGISTER_ENDPOINT: &str = "/auth/register";
pub(crate) const PROFILE_ENDPOINT: &str = "/admin/profile";
pub(crate) const TENANTS_ENDPOINT: &str = "/tenants/";

/// `{id}` for owner operations or `{username}` for the public profile.
pub(crate) fn tenant_endpoint(key: impl std::fmt::Display) -> String {
    format!("/tenants/{key}")
}

/// `{tenant_id}` for the owner list, `{username}` for public availability.
pub(crate) fn tenant_slots_endpoint(key: impl std::fmt::Display) -> String {
    format!("/tenants/{key}/slots")
}

pub(crate) fn book_slot_endpoint(username: &str, slot_id: i64) -> String {
    format!("/tenants/{username}/slots/{slot_id}/book")
}

pub(crate) fn slot_endpoint(slot_id: i64) -> String {
    format!("/slots/{slot_id}")
}

pub(crate) fn super_admin_endpoint(resource: &str) -> String {
    format!("/super-admin/{resource}")
}
