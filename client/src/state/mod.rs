//! Client-side stores.
//!
//! ARCHITECTURE
//! ============
//! Each store owns a plain state struct published through a `watch` channel,
//! so UI code can either take a snapshot or subscribe to changes. Store
//! operations bracket their work with [`LoadingGuard`], which keeps `loading`
//! true while at least one operation is in flight and resets it on every
//! exit path.

pub mod admin;
pub mod session;
pub mod slots;
pub mod tenants;


use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

/// State structs that carry the shared `loading` / `error` pair.
pub trait StoreState {
    fn loading_mut(&mut self) -> &mut bool;
    fn error_mut(&mut self) -> &mut Option<String>;
}

/// Shared state cell plus in-flight operation counter.
pub(crate) struct StoreCell<S> {
    tx: watch::Sender<S>,
    inflight: AtomicUsize,
}

impl<S: StoreState + Clone> StoreCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, inflight: AtomicUsize::new(0) }
    }

    pub(crate) fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Mark an operation as started: `loading` on, `error` cleared.
    pub(crate) fn begin(&self) -> LoadingGuard<'_, S> {
        self.inflight.fetch_add(1, Ordering::SeqCst);
        self.update(|s| {
            *s.loading_mut() = true;
            *s.error_mut() = None;
        });
        LoadingGuard { cell: self }
    }

    pub(crate) fn fail(&self, message: String) {
        self.update(|s| *s.error_mut() = Some(message));
    }
}

/// Ends one operation when dropped.
pub(crate) struct LoadingGuard<'a, S: StoreState + Clone> {
    cell: &'a StoreCell<S>,
}

impl<S: StoreState + Clone> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        let remaining = self.cell.inflight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        self.cell.update(|s| *s.loading_mut() = remaining > 0);
    }
}
