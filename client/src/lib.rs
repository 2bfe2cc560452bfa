//! Browser-side client for the multi-tenant booking API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Authentication, tenant management and slot booking, all mediated by the
//! remote REST API. The interesting part is the session lifecycle: how the
//! token is acquired, persisted, refreshed, invalidated on 401 and enforced
//! by the navigation guard.
//!
//! ARCHITECTURE
//! ============
//! - `storage`: injected persistence for the bearer token
//! - `net`: transport seam, API wrapper, wire types, errors
//! - `state`: session, tenant, slot and super-admin stores
//! - `nav`: routes, shared location, navigation guard
//! - `app`: composition root wiring the above

pub mod app;
pub mod config;
pub mod nav;
pub mod net;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use app::BookingApp;
pub use config::ClientConfig;
pub use net::api::{ApiClient, ApiEvent};
pub use net::error::{ApiError, TransportError};
