//! Cart model.
//!
//! The cart is owned by the backend: the client holds whatever the last
//! successful response said and never patches it locally. The types here
//! only describe that response and the identity parameters sent with it.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::types::{GuestId, Price, ProductId, UserId};

/// One (product, size, color) combination with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price snapshot taken by the backend when the line was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    pub quantity: NonZeroU32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CartItem {
    /// The identity of this line inside its cart.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Quantity after applying `delta`, or `None` when it would drop below 1.
    ///
    /// Callers use `None` to skip the update call entirely.
    #[must_use]
    pub fn adjusted_quantity(&self, delta: i64) -> Option<NonZeroU32> {
        let next = i64::from(self.quantity.get()).checked_add(delta)?;
        u32::try_from(next).ok().and_then(NonZeroU32::new)
    }

    /// Unit price times quantity; lines without a price snapshot count as zero.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.unwrap_or(Price::ZERO) * self.quantity.get()
    }
}

/// Identity of a cart line: distinct (size, color) pairs of the same product
/// are distinct lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LineKey {
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>) -> Self {
        Self {
            product_id: product_id.into(),
            size: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// The cart as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "products", default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Price,
}

impl Cart {
    /// A cart with no lines and a zero total.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_price: Price::ZERO,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity.get()).sum()
    }

    /// Find the line with the given identity.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.key() == *key)
    }
}

/// Who owns a cart, sent as `userId` / `guestId` with every cart call.
///
/// Both may be present: the backend prefers the user and falls back to the
/// guest cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
}

impl CartIdentity {
    #[must_use]
    pub const fn guest(guest_id: GuestId) -> Self {
        Self {
            user_id: None,
            guest_id: Some(guest_id),
        }
    }

    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            guest_id: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new("P1"),
            name: Some("Trail Runner".to_string()),
            image: None,
            price: Some(Price::from_cents(4999)),
            quantity: NonZeroU32::new(quantity).unwrap(),
            size: Some("9".to_string()),
            color: Some("Black".to_string()),
        }
    }

    #[test]
    fn test_decode_backend_cart() {
        let cart: Cart = serde_json::from_value(json!({
            "_id": "c1",
            "guestId": "guest_1",
            "products": [{
                "productId": "P1",
                "name": "Trail Runner",
                "price": 49.99,
                "quantity": 2,
                "size": "9",
                "color": "Black"
            }],
            "totalPrice": 99.98
        }))
        .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_price, Price::from_cents(9998));
    }

    #[test]
    fn test_zero_quantity_is_rejected_at_decode() {
        let result = serde_json::from_value::<CartItem>(json!({
            "productId": "P1",
            "quantity": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let cart: Cart = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cart, Cart::empty());
    }

    #[test]
    fn test_line_identity_includes_size_and_color() {
        let mut other = item(1);
        other.size = Some("11".to_string());
        assert_ne!(item(1).key(), other.key());

        let cart = Cart {
            items: vec![item(1), other],
            total_price: Price::ZERO,
        };
        let key = LineKey::new("P1").with_size("11").with_color("Black");
        assert_eq!(cart.find(&key).unwrap().size.as_deref(), Some("11"));
    }

    #[test]
    fn test_adjusted_quantity_guard() {
        assert_eq!(item(1).adjusted_quantity(-1), None);
        assert_eq!(item(1).adjusted_quantity(1).map(NonZeroU32::get), Some(2));
        assert_eq!(item(3).adjusted_quantity(-1).map(NonZeroU32::get), Some(2));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(2).line_total(), Price::from_cents(9998));
    }

    #[test]
    fn test_identity_omits_absent_fields() {
        let identity = CartIdentity::guest(GuestId::new("guest_1"));
        assert_eq!(
            serde_json::to_value(&identity).unwrap(),
            json!({ "guestId": "guest_1" })
        );
    }
}
