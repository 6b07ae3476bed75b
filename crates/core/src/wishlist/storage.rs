//! Key/value persistence behind the wishlist store.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;

/// Storage key holding the JSON array of wishlist entries.
pub const WISHLIST_KEY: &str = "wishlist";

/// Storage key holding the current toast, if any.
pub const TOAST_KEY: &str = "wishlist_toast";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not complete the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A value could not be serialized for writing.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key/value storage scoped to one visitor.
///
/// Values are whole documents: every write replaces the previous value.
pub trait WishlistStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete `key`; deleting a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// In-process storage, used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one raw value.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut values) = storage.values.lock() {
            values.insert(key.to_owned(), value.into());
        }
        storage
    }

    /// Synchronous read for assertions.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn with_values<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, StorageError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Backend("Lock poisoned".to_string()))?;
        Ok(f(&mut values))
    }
}

impl WishlistStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_values(|values| values.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.with_values(|values| {
            values.insert(key.to_owned(), value);
        })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_values(|values| {
            values.remove(key);
        })
    }
}

impl<S: WishlistStorage> WishlistStorage for &S {
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).read(key)
    }

    fn write(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).remove(key)
    }
}
