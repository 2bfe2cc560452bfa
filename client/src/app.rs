//! Composition root.
//!
//! ARCHITECTURE
//! ============
//! Construction order is storage → location → API client → session store →
//! router, each handed to the next explicitly. Domain stores share the same
//! API client. API events are drained here and applied to the session and
//! the router, so navigation decisions stay in one place.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use crate::config::ClientConfig;
use crate::nav::{Location, Route, Router};
use crate::net::api::{ApiClient, ApiEvent};
use crate::net::error::TransportError;
use crate::state::admin::AdminStore;
use crate::state::session::SessionStore;
use crate::state::slots::SlotStore;
use crate::state::tenants::TenantStore;
use crate::storage::TokenStore;

pub struct BookingApp {
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub tenants: TenantStore,
    pub slots: SlotStore,
    pub admin: AdminStore,
    pub router: Router,
    events: Mutex<broadcast::Receiver<ApiEvent>>,
}

impl BookingApp {
    /// Wire every store around an existing API client.
    pub fn new(api: Arc<ApiClient>) -> Self {
        let events = Mutex::new(api.subscribe());
        let session = Arc::new(SessionStore::new(api.clone()));
        let router = Router::new(api.location().clone(), api.tokens().clone(), session.clone());
        Self {
            tenants: TenantStore::new(api.clone()),
            slots: SlotStore::new(api.clone()),
            admin: AdminStore::new(api.clone()),
            session,
            router,
            api,
            events,
        }
    }

    /// Build the app over a `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        initial_path: &str,
    ) -> Result<Self, TransportError> {
        let api = ApiClient::from_config(config, tokens, Location::new(initial_path))?;
        Ok(Self::new(Arc::new(api)))
    }

    /// Startup hook: restore the session from the persisted token.
    pub async fn start(&self) {
        self.session.init().await;
    }

    /// Apply one API event to the session and the router.
    pub async fn handle_event(&self, event: &ApiEvent) -> Option<Route> {
        match event {
            ApiEvent::SessionExpired { .. } => self.session.expire().await,
        }
        self.router.on_api_event(event)
    }

    /// Apply every event queued so far. Returns the last redirect taken.
    pub async fn drain_events(&self) -> Option<Route> {
        let mut redirect = None;
        loop {
            let next = self.events.lock().await.try_recv();
            match next {
                Ok(event) => {
                    if let Some(route) = self.handle_event(&event).await {
                        redirect = Some(route);
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "api events dropped");
                }
                Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                    return redirect;
                }
            }
        }
    }

    /// Apply events as they arrive, for the lifetime of the returned future.
    ///
    /// The loop holds its own subscription, taken when this is called, so it
    /// never contends with [`BookingApp::drain_events`]. Events reach both;
    /// applying one twice is harmless since expiry is idempotent and the
    /// router ignores it once on the login page.
    pub fn run_event_loop(&self) -> impl Future<Output = ()> + '_ {
        let mut events = self.api.subscribe();
        async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        self.handle_event(&event).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "api events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        }
    }
}
