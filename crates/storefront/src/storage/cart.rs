//! Persisted cart mirror.

use the_wind_core::Cart;
use tracing::debug;

use super::{SharedStore, StorageError, keys};

/// Reads and writes the single persisted cart record.
///
/// There is no shape validation beyond decoding: a missing, unreadable or
/// corrupted record loads as the empty cart.
#[derive(Clone)]
pub struct CartStorage {
    store: SharedStore,
}

impl CartStorage {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The stored cart, or the empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.store.get(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::empty(),
            Err(e) => {
                debug!(error = %e, "Could not read persisted cart");
                return Cart::empty();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            debug!(error = %e, "Persisted cart is not valid, starting empty");
            Cart::empty()
        })
    }

    /// Overwrite the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized or written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.store.set(keys::CART, &raw)
    }

    /// Remove the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::CART)
    }
}
