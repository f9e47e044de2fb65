//! Checkout and order records.
//!
//! A checkout is a server-side snapshot of the cart plus shipping details.
//! It moves created → paid → finalized; finalizing produces an [`Order`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{CheckoutId, OrderId, OrderStatus, Price, ProductId};

/// Payment method recorded on every checkout created by this client.
pub const PAYMENT_METHOD_PAYPAL: &str = "paypal";

/// Placeholder name for cart lines the backend returned without one.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// Days added to the order date for the delivery estimate.
pub const DELIVERY_ESTIMATE_DAYS: i64 = 10;

/// Delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// One line of a checkout or order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckout {
    pub checkout_items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: Price,
    pub shipping_price: Price,
    pub tax_price: Price,
    pub total_price: Price,
}

impl NewCheckout {
    /// Snapshot the cart into a checkout request.
    ///
    /// Returns `None` for an empty cart. Lines missing display fields are
    /// filled with placeholders; shipping and tax are zero.
    #[must_use]
    pub fn from_cart(cart: &Cart, shipping_address: ShippingAddress) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }

        let checkout_items = cart
            .items
            .iter()
            .map(|item| CheckoutItem {
                product_id: item.product_id.clone(),
                name: item
                    .name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string()),
                image: item.image.clone().unwrap_or_default(),
                price: item.price.unwrap_or(Price::ZERO),
                quantity: item.quantity.get(),
                size: item.size.clone(),
                color: item.color.clone(),
            })
            .collect();

        Some(Self {
            checkout_items,
            shipping_address,
            payment_method: PAYMENT_METHOD_PAYPAL.to_string(),
            items_price: cart.total_price,
            shipping_price: Price::ZERO,
            tax_price: Price::ZERO,
            total_price: cart.total_price,
        })
    }
}

/// A checkout as returned by `POST /api/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    #[serde(rename = "_id")]
    pub id: CheckoutId,
    #[serde(default)]
    pub checkout_items: Vec<CheckoutItem>,
    pub total_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /api/checkout/:id/pay`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation<'a, T: Serialize> {
    pub payment_status: &'static str,
    /// Provider capture payload, passed through verbatim.
    pub payment_details: &'a T,
}

impl<'a, T: Serialize> PaymentConfirmation<'a, T> {
    #[must_use]
    pub const fn paid(payment_details: &'a T) -> Self {
        Self {
            payment_status: "paid",
            payment_details,
        }
    }
}

/// An order owned by the backend; the client only displays it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_items: Vec<CheckoutItem>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub items_price: Price,
    #[serde(default)]
    pub shipping_price: Price,
    #[serde(default)]
    pub tax_price: Price,
    pub total_price: Price,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Estimated delivery date shown on the confirmation view.
    #[must_use]
    pub fn estimated_delivery(&self) -> DateTime<Utc> {
        estimated_delivery(self.created_at)
    }
}

/// `created_at` plus the fixed delivery window.
#[must_use]
pub fn estimated_delivery(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::days(DELIVERY_ESTIMATE_DAYS)
}

/// Customer summary embedded in admin order listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomer {
    #[serde(default)]
    pub name: String,
}

/// An order as listed by `/api/admin/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderCustomer>,
    pub total_price: Price,
    #[serde(default)]
    pub status: OrderStatus,
}
