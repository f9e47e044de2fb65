//! Cart state container.

use std::num::NonZeroU32;
use std::sync::Arc;

use the_wind_core::{Cart, CartIdentity, GuestId, LineKey, UserId};
use tracing::{instrument, warn};

use super::{RequestStatus, StateCell, Tracked};
use crate::api::{ApiClient, ApiError};
use crate::error::{Operation, OperationError};
use crate::storage::CartStorage;

/// Snapshot of the cart slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub cart: Cart,
    pub status: RequestStatus,
}

impl Tracked for CartState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Holds the cart and keeps its persisted mirror in step.
///
/// Every successful operation replaces the whole cart with the backend's
/// answer and writes it to storage; nothing is patched locally. A failed
/// write fails the operation, so memory and storage never disagree.
#[derive(Clone)]
pub struct CartContainer {
    inner: Arc<CartInner>,
}

struct CartInner {
    api: ApiClient,
    storage: CartStorage,
    state: StateCell<CartState>,
}

impl CartContainer {
    /// Create a container seeded from the persisted cart.
    #[must_use]
    pub fn new(api: ApiClient, storage: CartStorage) -> Self {
        let cart = storage.load();
        Self {
            inner: Arc::new(CartInner {
                api,
                storage,
                state: StateCell::new(CartState {
                    cart,
                    status: RequestStatus::default(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.inner.state.snapshot()
    }

    /// The cart currently held in memory.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.state.read(|state| state.cart.clone())
    }

    /// Reload the cart for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch cart` and leaves the cart unchanged.
    #[instrument(skip(self))]
    pub async fn fetch(&self, identity: &CartIdentity) -> Result<Cart, OperationError> {
        let call = self.inner.api.fetch_cart(identity);
        self.replace(Operation::FetchCart, call).await
    }

    /// Add `quantity` of a line.
    ///
    /// Whether a repeated line becomes a larger quantity or a second line
    /// is up to the backend; the returned cart is taken as-is.
    ///
    /// # Errors
    ///
    /// Returns `Failed to add item to cart` and leaves the cart unchanged.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        key: &LineKey,
        quantity: NonZeroU32,
        identity: &CartIdentity,
    ) -> Result<Cart, OperationError> {
        let call = self.inner.api.add_to_cart(key, quantity, identity);
        self.replace(Operation::AddToCart, call).await
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `Failed to update item quantity` and leaves the cart
    /// unchanged.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        key: &LineKey,
        quantity: NonZeroU32,
        identity: &CartIdentity,
    ) -> Result<Cart, OperationError> {
        let call = self.inner.api.update_cart_quantity(key, quantity, identity);
        self.replace(Operation::UpdateCartQuantity, call).await
    }

    /// Change a line's quantity by `delta`, as the cart's +/- buttons do.
    ///
    /// Returns `Ok(None)` without calling the backend when the line is not
    /// in the cart or the new quantity would drop below one.
    ///
    /// # Errors
    ///
    /// Returns `Failed to update item quantity` and leaves the cart
    /// unchanged.
    #[instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        key: &LineKey,
        delta: i64,
        identity: &CartIdentity,
    ) -> Result<Option<Cart>, OperationError> {
        let next = self.inner.state.read(|state| {
            state
                .cart
                .find(key)
                .and_then(|item| item.adjusted_quantity(delta))
        });

        match next {
            Some(quantity) => self.update_quantity(key, quantity, identity).await.map(Some),
            None => Ok(None),
        }
    }

    /// Drop a line.
    ///
    /// # Errors
    ///
    /// Returns `Failed to remove item` and leaves the cart unchanged.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        key: &LineKey,
        identity: &CartIdentity,
    ) -> Result<Cart, OperationError> {
        let call = self.inner.api.remove_from_cart(key, identity);
        self.replace(Operation::RemoveFromCart, call).await
    }

    /// Fold the guest cart into the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `Failed to merge cart` and leaves the cart unchanged.
    #[instrument(skip(self))]
    pub async fn merge(&self, guest_id: &GuestId, user_id: &UserId) -> Result<Cart, OperationError> {
        let call = self.inner.api.merge_cart(guest_id, user_id);
        self.replace(Operation::MergeCart, call).await
    }

    /// Empty the cart locally and erase the persisted copy. The backend is
    /// not told.
    pub fn clear(&self) {
        self.inner.state.update(|state| state.cart = Cart::empty());
        if let Err(e) = self.inner.storage.clear() {
            warn!(error = %e, "Failed to erase persisted cart");
        }
    }

    async fn replace(
        &self,
        operation: Operation,
        call: impl Future<Output = Result<Cart, ApiError>>,
    ) -> Result<Cart, OperationError> {
        let storage = &self.inner.storage;
        // A cart that cannot be persisted is not applied in memory either.
        let persisted = async move {
            let cart = call.await?;
            storage.save(&cart)?;
            Ok::<_, ApiError>(cart)
        };
        self.inner
            .state
            .track(operation, persisted, |state, cart| {
                state.cart = cart.clone();
                cart
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use the_wind_core::{CartItem, Price, ProductId};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::{KeyValueStore, MemoryStore, SharedStore, StorageError};

    /// Nothing listens on the discard port, so every call is rejected.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn seeded() -> (CartContainer, CartStorage) {
        let store = MemoryStore::shared();
        let storage = CartStorage::new(store.clone());
        storage
            .save(&Cart {
                items: vec![CartItem {
                    product_id: ProductId::new("P1"),
                    name: Some("Trail Runner".to_string()),
                    image: None,
                    price: Some(Price::from_cents(2500)),
                    quantity: NonZeroU32::MIN,
                    size: Some("9".to_string()),
                    color: Some("Black".to_string()),
                }],
                total_price: Price::from_cents(2500),
            })
            .unwrap();

        let config = StorefrontConfig::for_backend(UNREACHABLE, ".wind-test").unwrap();
        let api = ApiClient::new(&config, store).unwrap();
        (CartContainer::new(api, storage.clone()), storage)
    }

    fn line() -> LineKey {
        LineKey::new("P1").with_size("9").with_color("Black")
    }

    #[test]
    fn test_seeded_from_storage() {
        let (cart, _) = seeded();
        assert_eq!(cart.cart().item_count(), 1);
        assert!(!cart.snapshot().status.loading);
    }

    #[tokio::test]
    async fn test_rejected_call_keeps_cart() {
        let (cart, storage) = seeded();
        let before = cart.cart();
        let identity = CartIdentity::guest(GuestId::new("guest_1"));

        let err = cart
            .add(&line(), NonZeroU32::MIN, &identity)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to add item to cart");

        let state = cart.snapshot();
        assert_eq!(state.cart, before);
        assert!(!state.status.loading);
        assert_eq!(state.status.error.as_deref(), Some("Failed to add item to cart"));
        assert_eq!(storage.load(), before);
    }

    #[tokio::test]
    async fn test_decrement_below_one_is_noop() {
        let (cart, _) = seeded();
        let identity = CartIdentity::guest(GuestId::new("guest_1"));

        let result = cart.adjust_quantity(&line(), -1, &identity).await.unwrap();
        assert!(result.is_none());
        assert!(cart.snapshot().status.error.is_none());
    }

    #[tokio::test]
    async fn test_adjust_unknown_line_is_noop() {
        let (cart, _) = seeded();
        let identity = CartIdentity::guest(GuestId::new("guest_1"));

        let result = cart
            .adjust_quantity(&LineKey::new("P2"), 1, &identity)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    /// Reads like [`MemoryStore`]; every write fails.
    struct ReadOnlyStore(SharedStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("read-only").into())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("read-only").into())
        }
    }

    #[tokio::test]
    async fn test_failed_write_rejects_update() {
        let memory = MemoryStore::shared();
        let storage = CartStorage::new(memory.clone());
        let before = Cart::empty();
        let read_only: SharedStore = Arc::new(ReadOnlyStore(memory));
        let config = StorefrontConfig::for_backend(UNREACHABLE, ".wind-test").unwrap();
        let cart = CartContainer::new(
            ApiClient::new(&config, read_only.clone()).unwrap(),
            CartStorage::new(read_only),
        );

        let err = cart
            .replace(Operation::FetchCart, async {
                Ok(Cart {
                    items: vec![],
                    total_price: Price::from_cents(100),
                })
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch cart");
        assert!(matches!(err.source, ApiError::Storage(_)));
        assert_eq!(cart.cart(), before);
        assert_eq!(storage.load(), before);
        assert_eq!(cart.snapshot().status.error.as_deref(), Some("Failed to fetch cart"));
    }

    #[test]
    fn test_clear_is_local() {
        let (cart, storage) = seeded();
        cart.clear();
        assert_eq!(cart.cart(), Cart::empty());
        assert_eq!(storage.load(), Cart::empty());
        assert!(cart.snapshot().status.error.is_none());
    }
}
