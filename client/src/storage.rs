//! Persisted credential storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only the bearer token outlives a reload; everything else is re-fetched.
//! The store is injected into the API client and the router so tests can use
//! [`MemoryTokenStore`] and hosts can pick their persistence medium.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Default storage key for the persisted token.
pub const DEFAULT_TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("browser storage unavailable")]
    Unavailable,
}

/// Get/set/clear capability over a single credential blob.
pub trait TokenStore: Send + Sync {
    /// The persisted token, if any. Read failures are treated as absence.
    fn get(&self) -> Option<String>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the token could not be persisted.
    fn set(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the persisted token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the token could not be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local store; state is lost with the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: RwLock::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Stores the token as the sole contents of a file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                (!token.is_empty()).then(|| token.to_owned())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token file unreadable");
                None
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        std::fs::write(&self.path, token).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage` under a fixed key.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone)]
pub struct LocalStorageTokenStore {
    key: String,
}

#[cfg(feature = "hydrate")]
impl LocalStorageTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl TokenStore for LocalStorageTokenStore {
    fn get(&self) -> Option<String> {
        Self::storage()?.get_item(&self.key).ok().flatten()
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage.set_item(&self.key, token).map_err(|_| StorageError::Unavailable)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage.remove_item(&self.key).map_err(|_| StorageError::Unavailable)
    }
}
