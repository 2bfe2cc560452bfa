//! Navigation guard and router.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router is built after the session store and receives it directly, so
//! the admin check needs no deferred lookup. It is also the single place that
//! turns an `ApiEvent::SessionExpired` into a redirect.

use std::sync::Arc;

use super::location::Location;
use super::route::Route;
use crate::net::api::ApiEvent;
use crate::state::session::SessionStore;
use crate::storage::TokenStore;

/// Upper bound on chained guard redirects for one navigation.
const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(Route),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("too many redirects while navigating to {path}")]
    TooManyRedirects { path: String },
}

pub struct Router {
    location: Location,
    tokens: Arc<dyn TokenStore>,
    session: Arc<SessionStore>,
}

impl Router {
    pub fn new(location: Location, tokens: Arc<dyn TokenStore>, session: Arc<SessionStore>) -> Self {
        Self { location, tokens, session }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        Route::parse(&self.location.path())
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Decide whether a transition to `to` may proceed.
    ///
    /// | condition                          | decision             |
    /// |------------------------------------|----------------------|
    /// | needs auth, no persisted token     | redirect `/login`    |
    /// | needs admin, user is not an admin  | redirect `/dashboard`|
    /// | otherwise                          | proceed              |
    ///
    /// For admin routes the session is initialised first when a token exists
    /// but the profile has not been loaded.
    pub async fn before_each(&self, to: &Route) -> GuardDecision {
        let meta = to.meta();
        let token = self.tokens.get();

        if meta.requires_auth && token.is_none() {
            tracing::debug!(to = %to, "no token; redirecting to login");
            return GuardDecision::Redirect(Route::Login);
        }

        if meta.requires_admin {
            if self.session.snapshot().user.is_none() && token.is_some() {
                self.session.init().await;
            }
            if !self.session.snapshot().is_admin() {
                tracing::debug!(to = %to, "not an admin; redirecting to dashboard");
                return GuardDecision::Redirect(Route::Dashboard);
            }
        }

        GuardDecision::Proceed
    }

    /// Run the guard for `path`, follow its redirects and commit the result.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::TooManyRedirects`] if the guard keeps redirecting.
    pub async fn navigate(&self, path: &str) -> Result<Route, NavigationError> {
        let mut target = Route::parse(path);
        for _ in 0..=MAX_REDIRECTS {
            match self.before_each(&target).await {
                GuardDecision::Proceed => {
                    self.location.set(target.path());
                    return Ok(target);
                }
                GuardDecision::Redirect(next) => target = next,
            }
        }
        Err(NavigationError::TooManyRedirects { path: path.to_owned() })
    }

    /// React to an API event. Returns the route navigated to, if any.
    pub fn on_api_event(&self, event: &ApiEvent) -> Option<Route> {
        match event {
            ApiEvent::SessionExpired { path } => {
                if self.location.is_auth_page() {
                    return None;
                }
                tracing::info!(api_path = %path, "session expired; redirecting to login");
                self.location.set(Route::Login.path());
                Some(Route::Login)
            }
        }
    }
}
