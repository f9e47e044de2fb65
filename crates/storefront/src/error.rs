//! Operation errors with Sentry integration.
//!
//! Every container operation fails with an [`OperationError`]. Its display
//! text is the generic per-operation message shown to the shopper; the
//! typed cause stays available through `source()` for logs and Sentry.

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;

/// Every operation a state container can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchCart,
    AddToCart,
    UpdateCartQuantity,
    RemoveFromCart,
    MergeCart,
    Login,
    Register,
    FetchProducts,
    FetchProductDetails,
    FetchSimilarProducts,
    FetchNewArrivals,
    FetchBestSeller,
    UpdateProduct,
    CreateCheckout,
    PayCheckout,
    FinalizeCheckout,
    FetchMyOrders,
    FetchOrderDetails,
    FetchUsers,
    AddUser,
    UpdateUser,
    DeleteUser,
    FetchAdminProducts,
    CreateProduct,
    DeleteProduct,
    FetchAllOrders,
    UpdateOrderStatus,
    DeleteOrder,
    UploadImage,
}

impl Operation {
    /// The message shown when this operation fails, whatever the cause.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::FetchCart => "Failed to fetch cart",
            Self::AddToCart => "Failed to add item to cart",
            Self::UpdateCartQuantity => "Failed to update item quantity",
            Self::RemoveFromCart => "Failed to remove item",
            Self::MergeCart => "Failed to merge cart",
            Self::Login => "Failed to log in",
            Self::Register => "Failed to register",
            Self::FetchProducts | Self::FetchAdminProducts => "Failed to fetch products",
            Self::FetchProductDetails => "Failed to fetch product details",
            Self::FetchSimilarProducts => "Failed to fetch similar products",
            Self::FetchNewArrivals => "Failed to fetch new arrivals",
            Self::FetchBestSeller => "Failed to load best seller product",
            Self::UpdateProduct => "Failed to update product",
            Self::CreateCheckout => "Checkout failed",
            Self::PayCheckout => "Payment processing failed. Please try again.",
            Self::FinalizeCheckout => "Order finalization failed.",
            Self::FetchMyOrders | Self::FetchAllOrders => "Failed to fetch orders",
            Self::FetchOrderDetails => "Failed to fetch order details",
            Self::FetchUsers => "Failed to fetch users",
            Self::AddUser => "Failed to add user",
            Self::UpdateUser => "Failed to update user",
            Self::DeleteUser => "Failed to delete user",
            Self::CreateProduct => "Failed to create product",
            Self::DeleteProduct => "Failed to delete product",
            Self::UpdateOrderStatus => "Failed to update order",
            Self::DeleteOrder => "Failed to delete order",
            Self::UploadImage => "Failed to upload image",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A failed container operation.
#[derive(Debug, Error)]
#[error("{}", .operation.failure_message())]
pub struct OperationError {
    pub operation: Operation,
    #[source]
    pub source: ApiError,
}

impl OperationError {
    #[must_use]
    pub const fn new(operation: Operation, source: ApiError) -> Self {
        Self { operation, source }
    }

    /// Whether the failure happened on our side of the wire (transport,
    /// decoding, local storage) rather than being a backend rejection.
    #[must_use]
    pub const fn is_client_side(&self) -> bool {
        !matches!(
            self.source,
            ApiError::Status { .. } | ApiError::MissingToken | ApiError::InvalidInput(_)
        )
    }

    /// Log the failure and, for client-side failures, capture it to Sentry.
    pub fn report(&self) {
        if self.is_client_side() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                operation = %self.operation,
                error = %self.source,
                sentry_event_id = %event_id,
                "{self}"
            );
        } else {
            tracing::warn!(operation = %self.operation, error = %self.source, "{self}");
        }
    }
}

/// Steps of a checkout, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    NoCheckout,
    Created,
    Paid,
    Finalized,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoCheckout => "no-checkout",
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Finalized => "finalized",
        })
    }
}

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requested with nothing in the cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The requested step does not follow the current one.
    #[error("cannot {action} a checkout in state {from}")]
    InvalidTransition {
        from: CheckoutStage,
        action: &'static str,
    },

    /// No payment client id is configured.
    #[error("PayPal configuration error. Please contact support.")]
    PaymentNotConfigured,

    /// The payment provider did not approve the payment.
    #[error("Payment was not approved: {0}")]
    PaymentDeclined(String),

    #[error(transparent)]
    Create(OperationError),

    #[error(transparent)]
    Pay(OperationError),

    #[error(transparent)]
    Finalize(OperationError),
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
