//! Wishlist persistence in the visitor's session.
//!
//! Each request loads the wishlist from the session, mutates it and writes it
//! back. Every tab of one browser shares the session cookie, so all tabs see
//! the same wishlist on their next request.

use cozy_furniture_core::wishlist::{StorageError, WishlistStorage, WishlistStore};
use serde_json::Value;
use tower_sessions::Session;

use crate::error::Result;

/// [`WishlistStorage`] backed by a `tower-sessions` session.
///
/// Values are stored as JSON strings. A value written as raw JSON by another
/// client is handed to the store re-encoded, so it is parsed the same way.
#[derive(Clone)]
pub struct SessionStorage {
    session: Session,
}

impl SessionStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

fn backend_error(err: &tower_sessions::session::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl WishlistStorage for SessionStorage {
    async fn read(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        let value = self
            .session
            .get_value(key)
            .await
            .map_err(|e| backend_error(&e))?;

        Ok(value.map(|value| match value {
            Value::String(raw) => raw,
            other => other.to_string(),
        }))
    }

    async fn write(&self, key: &str, value: String) -> std::result::Result<(), StorageError> {
        self.session
            .insert_value(key, Value::String(value))
            .await
            .map(|_| ())
            .map_err(|e| backend_error(&e))
    }

    async fn remove(&self, key: &str) -> std::result::Result<(), StorageError> {
        self.session
            .remove_value(key)
            .await
            .map(|_| ())
            .map_err(|e| backend_error(&e))
    }
}

/// Load the wishlist of the session's visitor.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load(session: Session) -> Result<WishlistStore<SessionStorage>> {
    Ok(WishlistStore::load(SessionStorage::new(session)).await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use cozy_furniture_core::wishlist::WISHLIST_KEY;
    use cozy_furniture_core::{Product, ProductId};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_round_trip_through_session() {
        let session = session();

        let mut wishlist = load(session.clone()).await.unwrap();
        wishlist
            .add(Product::new("4", "Classic Chesterfield Sofa", Decimal::new(1899, 0)))
            .await
            .unwrap();

        let reloaded = load(session.clone()).await.unwrap();
        assert!(reloaded.contains(&ProductId::new("4")));

        let raw: Option<String> = session.get(WISHLIST_KEY).await.unwrap();
        assert!(raw.unwrap().starts_with('['));
    }

    #[tokio::test]
    async fn test_raw_json_value_is_read() {
        let session = session();
        session
            .insert_value(WISHLIST_KEY, serde_json::json!(["1", 2]))
            .await
            .unwrap();

        let wishlist = load(session).await.unwrap();
        assert_eq!(wishlist.len(), 2);
        assert!(wishlist.contains(&ProductId::new("2")));
    }

    #[tokio::test]
    async fn test_corrupt_value_is_removed() {
        let session = session();
        session
            .insert(WISHLIST_KEY, "{not json".to_string())
            .await
            .unwrap();

        let wishlist = load(session.clone()).await.unwrap();
        assert!(wishlist.is_empty());
        assert!(session.get_value(WISHLIST_KEY).await.unwrap().is_none());
    }
}
