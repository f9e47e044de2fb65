//! In-memory state of the mock backend.

use std::collections::HashMap;
use std::num::NonZeroU32;

use serde_json::Value;
use the_wind_core::{
    Cart, CartItem, CheckoutItem, Email, Order, OrderStatus, Price, Product, ProductId,
    ProductImage, Role, ShippingAddress, User, UserId,
};
use uuid::Uuid;

/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Seeded customer account.
pub const SHOPPER_EMAIL: &str = "shopper@example.com";
pub const SHOPPER_PASSWORD: &str = "secret123";

/// Account plus the password it signs in with.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub password: String,
}

/// Checkout awaiting payment or finalization.
#[derive(Debug, Clone)]
pub struct StoredCheckout {
    pub id: String,
    pub owner: UserId,
    pub items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub total_price: Price,
    pub payment_details: Option<Value>,
    pub finalized: bool,
}

/// Placed order and who placed it.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub order: Order,
    pub owner: UserId,
}

/// Everything the mock backend knows.
#[derive(Debug, Default)]
pub struct BackendState {
    pub products: Vec<Product>,
    pub accounts: Vec<Account>,
    pub tokens: HashMap<String, UserId>,
    /// Cart lines keyed by owner (`user:<id>` or `guest:<id>`)
    pub carts: HashMap<String, Vec<CartItem>>,
    pub checkouts: HashMap<String, StoredCheckout>,
    pub orders: Vec<StoredOrder>,
    /// File names received by the upload endpoint
    pub uploads: Vec<String>,
    /// `METHOD /path` of every request, in arrival order
    pub requests: Vec<String>,
    /// Path prefixes that answer 500
    pub failing: Vec<String>,
}

pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn user_owner(id: &str) -> String {
    format!("user:{id}")
}

pub fn guest_owner(id: &str) -> String {
    format!("guest:{id}")
}

pub fn cart_of(lines: &[CartItem]) -> Cart {
    Cart {
        items: lines.to_vec(),
        total_price: lines.iter().map(CartItem::line_total).sum(),
    }
}

impl BackendState {
    /// A small catalog, one admin and one customer.
    #[must_use]
    pub fn seeded() -> Self {
        let mut state = Self::default();
        state.products = vec![
            product("P1", "Trail Runner", 4999, "Footwear", "Men", &["9", "10", "11"], &["Black", "Red"], "Wind"),
            product("P2", "Canvas Low", 5900, "Footwear", "Women", &["7", "8", "9"], &["White"], "Breeze"),
            product("P3", "Rain Shell", 12000, "Top Wear", "Women", &["S", "M", "L"], &["Yellow"], "Wind"),
            product("P4", "Fleece Hoodie", 6500, "Top Wear", "Men", &["M", "L"], &["Grey", "Black"], "Gust"),
            product("P5", "Summit Boot", 15000, "Footwear", "Men", &["10", "11"], &["Brown"], "Wind"),
        ];
        state.accounts = vec![
            account("U-ADMIN", "Admin", ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin),
            account("U-SHOPPER", "Shopper", SHOPPER_EMAIL, SHOPPER_PASSWORD, Role::Customer),
        ];
        state
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.user.email.as_str().eq_ignore_ascii_case(email))
    }

    pub fn user_for_token(&self, token: &str) -> Option<User> {
        let id = self.tokens.get(token)?;
        self.accounts
            .iter()
            .find(|account| &account.user.id == id)
            .map(|account| account.user.clone())
    }

    /// Issue a bearer token for `user_id`.
    pub fn issue_token(&mut self, user_id: &UserId) -> String {
        let token = format!("token-{}", new_id());
        self.tokens.insert(token.clone(), user_id.clone());
        token
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// Fold `line` into `lines`, summing quantities on an identical
    /// (product, size, color).
    pub fn add_line(lines: &mut Vec<CartItem>, line: CartItem) {
        match lines.iter_mut().find(|existing| existing.key() == line.key()) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity.get());
            }
            None => lines.push(line),
        }
    }

    /// Cart line for `quantity` of a catalog product.
    pub fn line_for(
        &self,
        product_id: &str,
        quantity: NonZeroU32,
        size: Option<String>,
        color: Option<String>,
    ) -> Option<CartItem> {
        let product = self.product(product_id)?;
        Some(CartItem {
            product_id: product.id.clone(),
            name: Some(product.name.clone()),
            image: product.images.first().map(|image| image.url.clone()),
            price: Some(product.price),
            quantity,
            size,
            color,
        })
    }

    /// Set a placed order's status; `None` for an unknown id.
    pub fn set_order_status(&mut self, id: &str, status: OrderStatus) -> Option<&StoredOrder> {
        let stored = self.orders.iter_mut().find(|o| o.order.id.as_str() == id)?;
        stored.order.status = Some(status);
        stored.order.is_delivered = status == OrderStatus::Delivered;
        Some(stored)
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    cents: i64,
    category: &str,
    gender: &str,
    sizes: &[&str],
    colors: &[&str],
    brand: &str,
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        price: Price::from_cents(cents),
        discount_price: None,
        description: Some(format!("{name} by {brand}")),
        brand: Some(brand.to_string()),
        material: Some("Cotton".to_string()),
        sizes: sizes.iter().map(ToString::to_string).collect(),
        colors: colors.iter().map(ToString::to_string).collect(),
        images: vec![ProductImage {
            url: format!("https://cdn.test/{id}.jpg"),
            alt_text: Some(name.to_string()),
        }],
        category: Some(category.to_string()),
        gender: Some(gender.to_string()),
        collections: vec!["all".to_string()],
        is_published: true,
        is_featured: false,
        sku: format!("SKU-{id}"),
        count_in_stock: 10,
    }
}

fn account(id: &str, name: &str, email: &str, password: &str, role: Role) -> Account {
    Account {
        user: User {
            id: UserId::from(id),
            name: name.to_string(),
            email: Email::parse(email).unwrap_or_else(|e| panic!("seed email {email}: {e}")),
            role,
        },
        password: password.to_string(),
    }
}
