//! Slot state: the owner's schedule and a tenant's public availability.
//!
//! DESIGN
//! ======
//! `slots` (owner view, by tenant id) and `available` (public view, by
//! username) are populated by separate fetches and never merged. Booking
//! only touches `available`; callers showing both must refetch `slots`.

#[cfg(test)]
#[path = "slots_test.rs"]
mod slots_test;

use std::sync::Arc;

use tokio::sync::watch;

use super::{StoreCell, StoreState};
use crate::net::api::{ApiClient, book_slot_endpoint, slot_endpoint, tenant_slots_endpoint};
use crate::net::error::ApiError;
use crate::net::transport::Method;
use crate::net::types::{AvailableSlot, BookingConfirmation, BookingRequest, Slot, SlotCreate};

pub const FETCH_SLOTS_FAILED: &str = "Failed to fetch slots";
pub const FETCH_AVAILABLE_FAILED: &str = "Failed to fetch available slots";
pub const CREATE_SLOT_FAILED: &str = "Failed to create slot";
pub const BOOK_SLOT_FAILED: &str = "Failed to book slot";
pub const DELETE_SLOT_FAILED: &str = "Failed to delete slot";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotsState {
    /// Owner view of one tenant's slots, booked or not.
    pub slots: Vec<Slot>,
    /// Public view of one tenant's still-bookable slots.
    pub available: Vec<AvailableSlot>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreState for SlotsState {
    fn loading_mut(&mut self) -> &mut bool {
        &mut self.loading
    }

    fn error_mut(&mut self) -> &mut Option<String> {
        &mut self.error
    }
}

pub struct SlotStore {
    api: Arc<ApiClient>,
    cell: StoreCell<SlotsState>,
}

impl SlotStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, cell: StoreCell::new(SlotsState::default()) }
    }

    #[must_use]
    pub fn snapshot(&self) -> SlotsState {
        self.cell.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SlotsState> {
        self.cell.subscribe()
    }

    pub async fn fetch_tenant_slots(&self, tenant_id: i64) {
        let _loading = self.cell.begin();
        match self.api.get_json::<Vec<Slot>>(&tenant_slots_endpoint(tenant_id)).await {
            Ok(slots) => self.cell.update(|s| s.slots = slots),
            Err(err) => self.cell.fail(err.user_message(FETCH_SLOTS_FAILED)),
        }
    }

    pub async fn fetch_available_slots(&self, tenant_username: &str) {
        let _loading = self.cell.begin();
        match self
            .api
            .get_json::<Vec<AvailableSlot>>(&tenant_slots_endpoint(tenant_username))
            .await
        {
            Ok(available) => self.cell.update(|s| s.available = available),
            Err(err) => self.cell.fail(err.user_message(FETCH_AVAILABLE_FAILED)),
        }
    }

    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn create_slot(&self, tenant_id: i64, data: &SlotCreate) -> Result<Slot, ApiError> {
        let _loading = self.cell.begin();
        let slot: Slot = self
            .api
            .send_json(Method::POST, &tenant_slots_endpoint(tenant_id), data)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(CREATE_SLOT_FAILED)))?;
        self.cell.update(|s| s.slots.push(slot.clone()));
        Ok(slot)
    }

    /// Book a public slot; on success it is no longer listed as available.
    ///
    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn book_slot(
        &self,
        tenant_username: &str,
        slot_id: i64,
        booking: &BookingRequest,
    ) -> Result<BookingConfirmation, ApiError> {
        let _loading = self.cell.begin();
        let confirmation: BookingConfirmation = self
            .api
            .send_json(Method::POST, &book_slot_endpoint(tenant_username, slot_id), booking)
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(BOOK_SLOT_FAILED)))?;
        self.cell.update(|s| s.available.retain(|slot| slot.id != slot_id));
        Ok(confirmation)
    }

    /// # Errors
    ///
    /// Propagates the [`ApiError`] after recording its message in `error`.
    pub async fn delete_slot(&self, slot_id: i64) -> Result<(), ApiError> {
        let _loading = self.cell.begin();
        self.api
            .delete(&slot_endpoint(slot_id))
            .await
            .inspect_err(|err| self.cell.fail(err.user_message(DELETE_SLOT_FAILED)))?;
        self.cell.update(|s| s.slots.retain(|slot| slot.id != slot_id));
        Ok(())
    }
}
