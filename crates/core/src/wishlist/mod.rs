//! Persisted wishlist store.
//!
//! A [`WishlistStore`] owns one visitor's saved products. It is loaded once
//! from a [`WishlistStorage`] backend, mutated in place, and writes the whole
//! entry array back under [`WISHLIST_KEY`] after every mutation.
//!
//! # States
//!
//! Each product is either absent or present:
//!
//! ```text
//!            add (toast: added)
//!   absent ─────────────────────▶ present
//!          ◀─────────────────────
//!           remove (toast: removed)
//!
//!   add on present / remove on absent: no-op, no toast
//!   clear: every present → absent, no toast
//! ```
//!
//! # Rehydration
//!
//! A stored value that fails to parse is discarded: the key is removed and the
//! store starts empty. Duplicate ids in a parsable value keep their first
//! occurrence.

mod entry;
mod storage;
mod toast;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::types::{Product, ProductId};

pub use entry::WishlistEntry;
pub use storage::{MemoryStorage, StorageError, TOAST_KEY, WISHLIST_KEY, WishlistStorage};
pub use toast::{TOAST_DURATION_MS, Toast, ToastAction};

/// One visitor's wishlist plus its pending notification.
#[derive(Debug)]
pub struct WishlistStore<S> {
    storage: S,
    entries: Vec<WishlistEntry>,
    toast: Option<Toast>,
}

impl<S: WishlistStorage> WishlistStore<S> {
    /// Rehydrate the store from `storage`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails. Corrupt stored data is not
    /// an error; it is removed and the store starts empty.
    pub async fn load(storage: S) -> Result<Self, StorageError> {
        let entries = match storage.read(WISHLIST_KEY).await? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<WishlistEntry>>(&raw) {
                Ok(entries) => dedupe(entries),
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt stored wishlist");
                    storage.remove(WISHLIST_KEY).await?;
                    Vec::new()
                }
            },
        };

        let toast = match storage.read(TOAST_KEY).await? {
            None => None,
            Some(raw) => {
                let parsed = serde_json::from_str::<Toast>(&raw).ok();
                if parsed.is_none() {
                    storage.remove(TOAST_KEY).await?;
                }
                parsed
            }
        };

        debug!(count = entries.len(), "Wishlist loaded");
        Ok(Self {
            storage,
            entries,
            toast,
        })
    }

    /// Saved entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is present.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    /// Saved ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ProductId> {
        self.entries.iter().map(WishlistEntry::id)
    }

    /// Add an entry if it is absent.
    ///
    /// Returns the "added" toast, or `None` when the product was already
    /// present (nothing is written in that case).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails. The in-memory state keeps
    /// the mutation.
    pub async fn add(
        &mut self,
        entry: impl Into<WishlistEntry>,
    ) -> Result<Option<Toast>, StorageError> {
        let entry = entry.into();
        if self.contains(entry.id()) {
            return Ok(None);
        }

        let toast = Toast::new(ToastAction::Added, entry.display_name());
        self.entries.push(entry);
        self.persist_entries().await?;
        self.show_toast(toast.clone()).await?;
        Ok(Some(toast))
    }

    /// Remove `id` if it is present.
    ///
    /// Returns the "removed" toast, or `None` when the product was absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub async fn remove(&mut self, id: &ProductId) -> Result<Option<Toast>, StorageError> {
        let Some(index) = self.entries.iter().position(|e| e.id() == id) else {
            return Ok(None);
        };

        let removed = self.entries.remove(index);
        let toast = Toast::new(ToastAction::Removed, removed.display_name());
        self.persist_entries().await?;
        self.show_toast(toast.clone()).await?;
        Ok(Some(toast))
    }

    /// Remove every entry in one write. Raises no toast.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.persist_entries().await
    }

    /// The last toast raised, regardless of age.
    #[must_use]
    pub const fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// The last toast, if it has not auto-hidden by `now`.
    #[must_use]
    pub fn visible_toast(&self, now: DateTime<Utc>) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| t.is_visible_at(now))
    }

    /// Hide the current toast before its timer runs out.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    pub async fn dismiss_toast(&mut self) -> Result<(), StorageError> {
        if self.toast.take().is_some() {
            self.storage.remove(TOAST_KEY).await?;
        }
        Ok(())
    }

    /// Refresh snapshot entries from the current catalog.
    ///
    /// Entries are never added or dropped: snapshots whose product is missing
    /// from `catalog` keep their stored data, and bare ids stay bare. Writes
    /// only when something changed. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub async fn refresh_snapshots(&mut self, catalog: &[Product]) -> Result<bool, StorageError> {
        let mut changed = false;
        for entry in &mut self.entries {
            if let WishlistEntry::Snapshot(snapshot) = entry
                && let Some(current) = catalog.iter().find(|p| p.id == snapshot.id)
                && **snapshot != *current
            {
                **snapshot = current.clone();
                changed = true;
            }
        }

        if changed {
            self.persist_entries().await?;
        }
        Ok(changed)
    }

    /// Give back the storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    async fn persist_entries(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.storage.write(WISHLIST_KEY, raw).await
    }

    async fn show_toast(&mut self, toast: Toast) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&toast)?;
        self.toast = Some(toast);
        self.storage.write(TOAST_KEY, raw).await
    }
}

/// Keep the first entry per id.
fn dedupe(entries: Vec<WishlistEntry>) -> Vec<WishlistEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.id().clone()))
        .collect()
}
