//! Networking modules for the booking REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the mockable HTTP seam, `api` wraps it with credential
//! injection and 401 handling, `types` defines the wire schema and `error`
//! the failure taxonomy shared by all stores.

pub mod api;
pub mod error;
pub mod transport;
pub mod types;
