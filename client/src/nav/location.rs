//! Current navigation location shared by the router and the API client.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

/// Cloneable handle on the current path. All clones observe the same value.
#[derive(Clone)]
pub struct Location {
    tx: Arc<watch::Sender<String>>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(path.into());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn path(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn set(&self, path: impl Into<String>) {
        self.tx.send_replace(path.into());
    }

    /// Receiver notified on every committed navigation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// True while the user is on the login or registration page.
    #[must_use]
    pub fn is_auth_page(&self) -> bool {
        let path = self.tx.borrow();
        path.contains(LOGIN_PATH) || path.contains(REGISTER_PATH)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Location").field(&*self.tx.borrow()).finish()
    }
}
