//! Persisted bearer token.

use secrecy::{ExposeSecret, SecretString};

use super::{SharedStore, StorageError, keys};

/// Reads and writes the `userToken` record.
#[derive(Clone)]
pub struct TokenStorage {
    store: SharedStore,
}

impl TokenStorage {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The stored token, if any. Blank records count as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .store
            .get(keys::USER_TOKEN)?
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from))
    }

    /// Persist a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set(keys::USER_TOKEN, token.expose_secret())
    }

    /// Forget the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::USER_TOKEN)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn test_token_round_trip() {
        let tokens = TokenStorage::new(MemoryStore::shared());
        assert!(tokens.load().unwrap().is_none());

        tokens.save(&SecretString::from("jwt-123")).unwrap();
        assert_eq!(tokens.load().unwrap().unwrap().expose_secret(), "jwt-123");

        tokens.clear().unwrap();
        assert!(tokens.load().unwrap().is_none());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let store = MemoryStore::shared();
        store.set(keys::USER_TOKEN, "  ").unwrap();
        assert!(TokenStorage::new(store).load().unwrap().is_none());
    }
}
