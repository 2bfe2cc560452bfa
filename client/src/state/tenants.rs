//! Tenant state for the owner dashboard and public booking pages.
//!
//! DESIGN
//! ======
//! `tenants` is the signed-in owner's collection in server order; `current`
//! is the public profile resolved by username for a booking page. The two
//! are fetched independently and never reconciled here.

#[cfg(test)]
#[path = "tenants_test.rs"]
mod tenants_test;

use std::sync::Arc;

use tokio::sync::watch;

use super::{StoreCell, StoreState};
use crate::net::api::{ApiClient, TENANTS_ENDPOINT, tenant_endpoint};
use crate::net::error::ApiError;
use crate::net::transport::Method;
use crate::net::types::{Tenant, TenantCreate, TenantProfile, TenantUpdate};

pub const FETCH_TENANTS_FAILED: &str = "Failed to fetch tenants";
pub const TENANT_NOT_FOUND: &str = "Tenant not found";
pub const CREATE_TENANT_FAILED: &str = "Failed to create tenant";
pub const UPDATE_TENANT_FAILED: &str = "Failed to update tenant";
pub const DELETE_TENANT_FAILED: &str = "Failed to delete tenant";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TenantsState {
    pub tenants: Vec<Tenant>,
    pub current: Option<TenantProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreState for TenantsState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

pub struct TenantStore {
    api: Arc<ApiClient>,
    cell: StoreCell<TenantsState>,
}

impl TenantStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, cell: StoreCell::new(TenantsState::default()) }
    }

    #[must_use]
    pub fn snapshot(&self) -> TenantsState {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TenantsState> {
        self.cell.subscribe()
    }

    /// Load the signed-in owner's tenants. Failures land in `error`.
    pub async fn fetch_user_tenants(&self) {
        let _loading = self.cell.begin();
        match self.api.get_json::<Vec<Tenant>>(TENANTS_ENDPOINT).await {
            Ok(tenants) => self.cell.update(|s| s.tenants = tenants),
            Err(err) => self.cell.fail(err.user_message(FETCH_TENANTS_FAILED)),
        }
    }

    /// Resolve the public profile behind a booking page.
    ///
    /// Sets `current` to the result; `None` (and an `error`) when the lookup fails.
    pub async fn fetch_tenant_by_username(&self, username: &str) -> Option<TenantProfile> {
        let _loading = self.cell.begin();
        match self.api.get_json::<TenantProfile>(&tenant_endpoint(username)).await {
            Ok(profile) => {
                self.cell.update(|s| s.current = Some(profile.clone()));
                Some(profile)
            }
            Err(err) => {
                self.cell.update(|s| {
                    s.error = Some(err.user_message(TENANT_NOT_FOUND));
                    s.current = None;
                });
                None
            }
        }
    }

    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn create_tenant(&self, data: &TenantCreate) -> Result<Tenant, ApiError> {
        let _loading = self.cell.begin();
        let tenant: Tenant = self
            .api
            .send_json(Method::POST, TENANTS_ENDPOINT, data)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(CREATE_TENANT_FAILED)))?;
        self.cell.update(|s| s.tenants.push(tenant.clone()));
        Ok(tenant)
    }

    /// Replace the cached entry with the same id, keeping its position.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn update_tenant(&self, tenant_id: i64, data: &TenantUpdate) -> Result<Tenant, ApiError> {
        let _loading = self.cell.begin();
        let tenant: Tenant = self
            .api
            .send_json(Method::PUT, &tenant_endpoint(tenant_id), data)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(UPDATE_TENANT_FAILED)))?;
        self.cell.update(|s| {
            if let Some(slot) = s.tenants.iter_mut().find(|t| t.id == tenant_id) {
                *slot = tenant.clone();
            }
        });
        Ok(tenant)
    }

    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn delete_tenant(&self, tenant_id: i64) -> Result<(), ApiError> {
        let _loading = self.cell.begin();
        self.api
            .delete(&tenant_endpoint(tenant_id))
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(DELETE_TENANT_FAILED)))?;
        self.cell.update(|s| s.tenants.retain(|t| t.id != tenant_id));
        Ok(())
    }
}
