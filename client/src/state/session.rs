//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Consulted by the navigation guard and by identity-aware views. The token
//! is persisted through the injected `TokenStore`; the user profile is always
//! re-fetched from `/api/auth/me`.
//!
//! DESIGN
//! ======
//! Every transition runs under one async gate, so overlapping calls (two
//! logins, a login racing a logout) apply one after the other instead of
//! interleaving their writes.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use super::{StoreCell, StoreState};
use crate::net::api::{ApiClient, LOGIN_ENDPOINT, ME_ENDPOINT, PROFILE_ENDPOINT, REGISTER_ENDPOINT};
use crate::net::error::ApiError;
use crate::net::transport::Method;
use crate::net::types::{Credentials, ProfileUpdate, RegisterRequest, TokenResponse, User};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTER_FAILED: &str = "Registration failed";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";

/// Where the session currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// No token.
    Anonymous,
    /// Token present, profile not loaded yet.
    Initializing,
    /// Token and profile loaded.
    Authenticated,
    /// The last operation failed; see `SessionState::error`.
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        // Without a token the session is anonymous; a failed login keeps its
        // message in `error` but does not leave the anonymous state.
        match (&self.token, &self.error, &self.user) {
            (None, _, _) => SessionStatus::Anonymous,
            (Some(_), Some(_), _) => SessionStatus::Error,
            (Some(_), None, None) => SessionStatus::Initializing,
            (Some(_), None, Some(_)) => SessionStatus::Authenticated,
        }
    }
}

impl StoreState for SessionState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

pub struct SessionStore {
    api: Arc<ApiClient>,
    cell: StoreCell<SessionState>,
    gate: Mutex<()>,
}

impl SessionStore {
    /// Start from whatever token is already persisted.
    pub fn new(api: Arc<ApiClient>) -> Self {
        let token = api.tokens().get();
        Self {
            api,
            cell: StoreCell::new(SessionState { token, ..SessionState::default() }),
            gate: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.cell.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.cell.snapshot().is_authenticated()
    }

    /// Exchange credentials for a token, persist it and load the profile.
    ///
    /// Returns `false` on failure with the reason left in `error`.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let _turn = self.gate.lock().await;
        let _loading = self.cell.begin();

        let credentials = Credentials { email: email.to_owned(), password: password.to_owned() };
        let response: TokenResponse = match self.api.send_json(Method::POST, LOGIN_ENDPOINT, &credentials).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "login rejected");
                self.cell.fail(err.user_message(LOGIN_FAILED));
                return false;
            }
        };

        let token = response.access_token;
        if let Err(e) = self.api.tokens().set(&token) {
            tracing::warn!(error = %e, "failed to persist token; session will not survive a reload");
        }
        self.api.set_default_token(&token);
        self.cell.update(|s| s.token = Some(token));

        self.refresh_user().await;
        tracing::info!("logged in");
        true
    }

    /// Drop the token and profile. No network call; safe to repeat.
    pub async fn logout(&self) {
        let _turn = self.gate.lock().await;
        self.clear_session();
        tracing::info!("logged out");
    }

    /// Apply a server-side invalidation (a 401 seen by the API client).
    pub async fn expire(&self) {
        let _turn = self.gate.lock().await;
        self.clear_session();
        tracing::info!("session expired");
    }

    /// Re-fetch the profile for the current token. No-op without a token.
    ///
    /// A 401 ends the session; other failures are logged and leave it intact.
    pub async fn get_current_user(&self) {
        let _turn = self.gate.lock().await;
        let _loading = self.cell.begin();
        self.refresh_user().await;
    }

    /// Restore the session from the persisted token, if any.
    pub async fn init(&self) {
        let _turn = self.gate.lock().await;
        let Some(token) = self.cell.snapshot().token.or_else(|| self.api.tokens().get()) else {
            return;
        };
        let _loading = self.cell.begin();
        self.api.set_default_token(&token);
        self.cell.update(|s| s.token = Some(token));
        self.refresh_user().await;
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let _turn = self.gate.lock().await;
        let _loading = self.cell.begin();
        self.api
            .send_json(Method::POST, REGISTER_ENDPOINT, request)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(REGISTER_FAILED)))
    }

    /// Update the signed-in user's profile and replace the cached user.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let _turn = self.gate.lock().await;
        let _loading = self.cell.begin();
        let user: User = self
            .api
            .send_json(Method::PUT, PROFILE_ENDPOINT, update)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(PROFILE_UPDATE_FAILED)))?;
        self.cell.update(|s| s.user = Some(user.clone()));
        Ok(user)
    }

    async fn refresh_user(&self) {
        let Some(token) = self.cell.snapshot().token else {
            return;
        };
        self.api.set_default_token(&token);

        match self.api.get_json::<User>(ME_ENDPOINT).await {
            Ok(user) => self.cell.update(|s| s.user = Some(user)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to get current user");
                if err.is_unauthorized() {
                    self.clear_session();
                }
            }
        }
    }

    fn clear_session(&self) {
        if let Err(e) = self.api.tokens().clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        self.api.clear_default_token();
        self.cell.update(|s| {
            s.token = None;
            s.user = None;
            s.error = None;
        });
    }
}
