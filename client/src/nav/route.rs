//! Client routes and their access requirements.

use std::fmt;

use super::location::{LOGIN_PATH, REGISTER_PATH};

pub const HOME_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const SUPER_ADMIN_PATH: &str = "/super-admin";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Dashboard,
    SuperAdmin,
    Login,
    Register,
    /// Public booking page of one tenant, `/:username`.
    TenantBooking { username: String },
    NotFound { path: String },
}

/// Access requirements attached to a route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl Route {
    /// Match a path (query and fragment ignored, trailing slash tolerated).
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            DASHBOARD_PATH => Self::Dashboard,
            SUPER_ADMIN_PATH => Self::SuperAdmin,
            LOGIN_PATH => Self::Login,
            REGISTER_PATH => Self::Register,
            other => match other.strip_prefix('/') {
                Some(segment) if !segment.is_empty() && !segment.contains('/') => {
                    Self::TenantBooking { username: segment.to_owned() }
                }
                _ => Self::NotFound { path: path.to_owned() },
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => HOME_PATH.to_owned(),
            Self::Dashboard => DASHBOARD_PATH.to_owned(),
            Self::SuperAdmin => SUPER_ADMIN_PATH.to_owned(),
            Self::Login => LOGIN_PATH.to_owned(),
            Self::Register => REGISTER_PATH.to_owned(),
            Self::TenantBooking { username } => format!("/{username}"),
            Self::NotFound { path } => path.clone(),
        }
    }

    #[must_use]
    pub fn meta(&self) -> RouteMeta {
        match self {
            Self::Dashboard => RouteMeta { requires_auth: true, requires_admin: false },
            Self::SuperAdmin => RouteMeta { requires_auth: true, requires_admin: true },
            Self::Home | Self::Login | Self::Register | Self::TenantBooking { .. } | Self::NotFound { .. } => {
                RouteMeta::default()
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
