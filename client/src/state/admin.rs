//! Platform-wide state for the super-admin console.
//!
//! Toggle endpoints answer with a message only, so a successful toggle flips
//! the cached flag locally rather than refetching.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;

use super::{StoreCell, StoreState};
use crate::net::api::{ApiClient, super_admin_endpoint};
use crate::net::error::ApiError;
use crate::net::transport::Method;
use crate::net::types::{AdminStats, MessageResponse, Slot, Tenant, User, UserCreate};

pub const FETCH_USERS_FAILED: &str = "Failed to fetch users";
pub const FETCH_TENANTS_FAILED: &str = "Failed to fetch tenants";
pub const FETCH_SLOTS_FAILED: &str = "Failed to fetch slots";
pub const FETCH_STATS_FAILED: &str = "Failed to fetch stats";
pub const CREATE_USER_FAILED: &str = "Failed to create user";
pub const UPDATE_USER_FAILED: &str = "Failed to update user";
pub const DELETE_USER_FAILED: &str = "Failed to delete user";
pub const UPDATE_TENANT_FAILED: &str = "Failed to update tenant";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminState {
    pub users: Vec<User>,
    pub tenants: Vec<Tenant>,
    pub slots: Vec<Slot>,
    pub stats: Option<AdminStats>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreState for AdminState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

pub struct AdminStore {
    api: Arc<ApiClient>,
    cell: StoreCell<AdminState>,
}

impl AdminStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, cell: StoreCell::new(AdminState::default()) }
    }

    #[must_use]
    pub fn snapshot(&self) -> AdminState {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AdminState> {
        self.cell.subscribe()
    }

    pub async fn fetch_users(&self) {
        if let Some(users) = self.read("users", FETCH_USERS_FAILED).await {
            self.cell.update(|s| s.users = users);
        }
    }

    pub async fn fetch_tenants(&self) {
        if let Some(tenants) = self.read("tenants", FETCH_TENANTS_FAILED).await {
            self.cell.update(|s| s.tenants = tenants);
        }
    }

    pub async fn fetch_slots(&self) {
        if let Some(slots) = self.read("slots", FETCH_SLOTS_FAILED).await {
            self.cell.update(|s| s.slots = slots);
        }
    }

    pub async fn fetch_stats(&self) {
        if let Some(stats) = self.read("stats", FETCH_STATS_FAILED).await {
            self.cell.update(|s| s.stats = Some(stats));
        }
    }

    /// Create an account on behalf of someone else and append it to `users`.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn create_user(&self, data: &UserCreate) -> Result<User, ApiError> {
        let _loading = self.cell.begin();
        let user: User = self
            .api
            .send_json(Method::POST, &super_admin_endpoint("users"), data)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(CREATE_USER_FAILED)))?;
        self.cell.update(|s| s.users.push(user.clone()));
        Ok(user)
    }

    /// Activate or deactivate a user account.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn toggle_user_status(&self, user_id: i64) -> Result<String, ApiError> {
        let message = self
            .mutate(&format!("users/{user_id}/toggle-status"), UPDATE_USER_FAILED)
            .await?;
        self.cell.update(|s| {
            if let Some(user) = s.users.iter_mut().find(|u| u.id == user_id) {
                user.is_active = !user.is_active;
            }
        });
        Ok(message)
    }

    /// Promote or demote a user. The server refuses changes to the caller's own account.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn toggle_user_admin(&self, user_id: i64) -> Result<String, ApiError> {
        let message = self
            .mutate(&format!("users/{user_id}/toggle-admin"), UPDATE_USER_FAILED)
            .await?;
        self.cell.update(|s| {
            if let Some(user) = s.users.iter_mut().find(|u| u.id == user_id) {
                user.is_admin = !user.is_admin;
            }
        });
        Ok(message)
    }

    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        let _loading = self.cell.begin();
        self.api
            .delete(&super_admin_endpoint(&format!("users/{user_id}")))
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(DELETE_USER_FAILED)))?;
        self.cell.update(|s| s.users.retain(|u| u.id != user_id));
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn toggle_tenant_status(&self, tenant_id: i64) -> Result<String, ApiError> {
        let message = self
            .mutate(&format!("tenants/{tenant_id}/toggle-status"), UPDATE_TENANT_FAILED)
            .await?;
        self.cell.update(|s| {
            if let Some(tenant) = s.tenants.iter_mut().find(|t| t.id == tenant_id) {
                tenant.is_active = !tenant.is_active;
            }
        });
        Ok(message)
    }

    async fn read<T: DeserializeOwned>(&self, resource: &str, fallback: &str) -> Option<T> {
        let _loading = self.cell.begin();
        match self.api.get_json::<T>(&super_admin_endpoint(resource)).await {
            Ok(value) => Some(value),
            Err(err) => {
                self.cell.fail(err.user_message(fallback));
                None
            }
        }
    }

    async fn mutate(&self, resource: &str, fallback: &str) -> Result<String, ApiError> {
        let _loading = self.cell.begin();
        let response: MessageResponse = self
            .api
            .send_empty(Method::PATCH, &super_admin_endpoint(resource))
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(fallback)))?;
        Ok(response.message)
    }
}
