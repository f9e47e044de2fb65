//! Composition root for the storefront containers.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use the_wind_core::{Cart, Checkout, LineKey, Order, ShippingAddress, User};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::containers::{
    CartContainer, CatalogContainer, CheckoutFlow, Destination, OrdersContainer,
    SessionContainer, post_login_destination,
};
use crate::error::{CheckoutError, OperationError};
use crate::payment::PaymentProvider;
use crate::storage::{CartStorage, FileStore, SharedStore};

/// Outcome of signing in or registering.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: User,
    /// Where the shopper goes next
    pub destination: Destination,
    /// Cart after folding the guest cart in, when a merge ran and succeeded
    pub merged_cart: Option<Cart>,
}

/// Order confirmation shown after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub order: Order,
    pub estimated_delivery: DateTime<Utc>,
}

/// Every storefront container, built over one store and one API client.
///
/// Cheap to clone. Containers are independent; the cross-container flows
/// (sign-in with cart merge, sign-out, checkout completion) live here.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    store: SharedStore,
    api: ApiClient,
    cart: CartContainer,
    session: SessionContainer,
    catalog: CatalogContainer,
    checkout: CheckoutFlow,
    orders: OrdersContainer,
}

impl Storefront {
    /// Build the containers over `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, store: SharedStore) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config, store.clone())?;
        let cart = CartContainer::new(api.clone(), CartStorage::new(store.clone()));
        let session = SessionContainer::new(api.clone(), store.clone());
        let catalog = CatalogContainer::new(api.clone());
        let checkout = CheckoutFlow::new(api.clone(), config.payment.clone());
        let orders = OrdersContainer::new(api.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                store,
                api,
                cart,
                session,
                catalog,
                checkout,
                orders,
            }),
        })
    }

    /// Build the containers over a [`FileStore`] in the configured state
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or the
    /// HTTP client cannot be built.
    pub fn open(config: StorefrontConfig) -> Result<Self, ApiError> {
        let store: SharedStore = Arc::new(FileStore::open(&config.state_dir)?);
        Self::new(config, store)
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn cart(&self) -> &CartContainer {
        &self.inner.cart
    }

    #[must_use]
    pub fn session(&self) -> &SessionContainer {
        &self.inner.session
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogContainer {
        &self.inner.catalog
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutFlow {
        &self.inner.checkout
    }

    #[must_use]
    pub fn orders(&self) -> &OrdersContainer {
        &self.inner.orders
    }

    // =========================================================================
    // Session flows
    // =========================================================================

    /// Log in, then fold a non-empty guest cart into the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `Failed to log in`. A failed merge is logged only.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
        redirect: Option<&str>,
    ) -> Result<SignIn, OperationError> {
        let user = self.inner.session.login(email, password).await?;
        Ok(self.after_sign_in(user, redirect).await)
    }

    /// Register, then fold a non-empty guest cart into the new account.
    ///
    /// # Errors
    ///
    /// Returns `Failed to register`. A failed merge is logged only.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        redirect: Option<&str>,
    ) -> Result<SignIn, OperationError> {
        let user = self.inner.session.register(name, email, password).await?;
        Ok(self.after_sign_in(user, redirect).await)
    }

    /// Sign out and empty the local cart.
    pub fn sign_out(&self) {
        self.inner.session.logout();
        self.inner.cart.clear();
    }

    async fn after_sign_in(&self, user: User, redirect: Option<&str>) -> SignIn {
        let guest_id = self.inner.session.guest_id();
        let merged_cart = if self.inner.cart.cart().is_empty() {
            None
        } else {
            match self.inner.cart.merge(&guest_id, &user.id).await {
                Ok(cart) => {
                    info!(user_id = %user.id, items = cart.items.len(), "Merged guest cart");
                    Some(cart)
                }
                Err(e) => {
                    warn!(user_id = %user.id, error = %e.source, "{e}");
                    None
                }
            }
        };

        SignIn {
            user,
            destination: post_login_destination(redirect),
            merged_cart,
        }
    }

    // =========================================================================
    // Cart shortcuts bound to the current identity
    // =========================================================================

    /// # Errors
    ///
    /// Returns `Failed to fetch cart`.
    pub async fn refresh_cart(&self) -> Result<Cart, OperationError> {
        let identity = self.inner.session.cart_identity();
        self.inner.cart.fetch(&identity).await
    }

    /// # Errors
    ///
    /// Returns `Failed to add item to cart`.
    pub async fn add_to_cart(&self, key: &LineKey, quantity: NonZeroU32) -> Result<Cart, OperationError> {
        let identity = self.inner.session.cart_identity();
        self.inner.cart.add(key, quantity, &identity).await
    }

    /// # Errors
    ///
    /// Returns `Failed to update item quantity`.
    pub async fn set_quantity(&self, key: &LineKey, quantity: NonZeroU32) -> Result<Cart, OperationError> {
        let identity = self.inner.session.cart_identity();
        self.inner.cart.update_quantity(key, quantity, &identity).await
    }

    /// `Ok(None)` when the change would drop the line below one.
    ///
    /// # Errors
    ///
    /// Returns `Failed to update item quantity`.
    pub async fn adjust_quantity(&self, key: &LineKey, delta: i64) -> Result<Option<Cart>, OperationError> {
        let identity = self.inner.session.cart_identity();
        self.inner.cart.adjust_quantity(key, delta, &identity).await
    }

    /// # Errors
    ///
    /// Returns `Failed to remove item`.
    pub async fn remove_from_cart(&self, key: &LineKey) -> Result<Cart, OperationError> {
        let identity = self.inner.session.cart_identity();
        self.inner.cart.remove(key, &identity).await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Create a checkout from the current cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::create`].
    pub async fn begin_checkout(&self, shipping_address: ShippingAddress) -> Result<Checkout, CheckoutError> {
        let cart = self.inner.cart.cart();
        self.inner.checkout.create(&cart, shipping_address).await
    }

    /// Payment success: pay, finalize, then clear the cart and return the
    /// confirmation.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::complete_payment`]. The cart is kept on failure.
    pub async fn complete_payment<T: Serialize + Sync>(
        &self,
        payment_details: &T,
    ) -> Result<Confirmation, CheckoutError> {
        let order = self.inner.checkout.complete_payment(payment_details).await?;
        Ok(self.confirm(order))
    }

    /// Approve through `provider`, then as [`Self::complete_payment`].
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::approve_with`]. The cart is kept on failure.
    pub async fn pay_with(&self, provider: &dyn PaymentProvider) -> Result<Confirmation, CheckoutError> {
        let order = self.inner.checkout.approve_with(provider).await?;
        Ok(self.confirm(order))
    }

    fn confirm(&self, order: Order) -> Confirmation {
        self.inner.cart.clear();
        self.inner.checkout.reset();
        Confirmation {
            estimated_delivery: order.estimated_delivery(),
            order,
        }
    }
}
