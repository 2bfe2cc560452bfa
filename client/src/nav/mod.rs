//! Client-side navigation: routes, the shared location and the guard.

pub mod location;
pub mod route;
pub mod router;


pub use location::Location;
pub use route::{Route, RouteMeta};
pub use router::{GuardDecision, NavigationError, Router};
