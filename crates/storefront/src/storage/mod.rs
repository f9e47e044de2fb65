//! Persisted client state.
//!
//! A tiny string key/value store standing in for browser local storage.
//! The client keeps exactly four records in it:
//!
//! - `cart` - JSON mirror of the last cart the backend returned
//! - `userToken` - bearer token for authenticated endpoints
//! - `userInfo` - JSON of the signed-in user
//! - `guestId` - identifier of the anonymous shopper's cart
//!
//! [`FileStore`] keeps one file per key under the state directory;
//! [`MemoryStore`] is used by tests and short-lived sessions.

mod cart;
mod file;
mod token;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

pub use cart::CartStorage;
pub use file::FileStore;
pub use token::TokenStorage;

/// Keys of the persisted records.
pub mod keys {
    /// JSON mirror of the current cart.
    pub const CART: &str = "cart";

    /// Bearer token for authenticated endpoints.
    pub const USER_TOKEN: &str = "userToken";

    /// JSON of the signed-in user.
    pub const USER_INFO: &str = "userInfo";

    /// Anonymous shopper identifier.
    pub const GUEST_ID: &str = "guestId";
}

/// Errors that can occur while reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous string key/value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Read a record. Absent keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a record. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by every container.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a new empty store in a [`SharedStore`].
    #[must_use]
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::GUEST_ID).unwrap(), None);

        store.set(keys::GUEST_ID, "guest_1").unwrap();
        assert_eq!(store.get(keys::GUEST_ID).unwrap().as_deref(), Some("guest_1"));

        store.set(keys::GUEST_ID, "guest_2").unwrap();
        assert_eq!(store.get(keys::GUEST_ID).unwrap().as_deref(), Some("guest_2"));

        store.remove(keys::GUEST_ID).unwrap();
        store.remove(keys::GUEST_ID).unwrap();
        assert_eq!(store.get(keys::GUEST_ID).unwrap(), None);
    }
}
