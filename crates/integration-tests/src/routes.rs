//! Mock backend routes.
//!
//! Just enough of the real backend's behaviour to drive the client end to
//! end: bearer-token auth, admin role checks, carts keyed by user or guest,
//! checkout → pay → finalize, and the admin CRUD endpoints.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use the_wind_core::order::OrderCustomer;
use the_wind_core::{
    AdminOrder, Cart, CheckoutItem, Email, LineKey, NewProduct, Order, OrderId, OrderStatus,
    Price, Product, ProductId, ProductUpdate, Role, ShippingAddress, User, UserId,
};

use crate::backend::{
    Account, BackendState, StoredCheckout, StoredOrder, cart_of, guest_owner, new_id, user_owner,
};

pub type Shared = Arc<Mutex<BackendState>>;

pub fn lock(shared: &Shared) -> MutexGuard<'_, BackendState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Error body in the backend's `{ message }` shape.
#[derive(Debug)]
pub struct Rejection(StatusCode, &'static str);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "message": self.1 }))).into_response()
    }
}

type Reply<T> = Result<Json<T>, Rejection>;
type Created<T> = Result<(StatusCode, Json<T>), Rejection>;

const fn not_found(what: &'static str) -> Rejection {
    Rejection(StatusCode::NOT_FOUND, what)
}

const fn bad_request(why: &'static str) -> Rejection {
    Rejection(StatusCode::BAD_REQUEST, why)
}

pub fn router(shared: Shared) -> Router {
    Router::new()
        // Cart
        .route(
            "/api/cart",
            get(fetch_cart)
                .post(add_to_cart)
                .put(update_cart)
                .delete(remove_from_cart),
        )
        .route("/api/cart/merge", post(merge_cart))
        // Catalog
        .route("/api/products", get(list_products))
        .route("/api/products/new-arrivals", get(new_arrivals))
        .route("/api/products/best-seller", get(best_seller))
        .route("/api/products/similar/{id}", get(similar_products))
        .route("/api/products/{id}", get(product_details).put(update_product))
        // Accounts
        .route("/api/users/login", post(login))
        .route("/api/users/register", post(register))
        // Checkout and orders
        .route("/api/checkout", post(create_checkout))
        .route("/api/checkout/{id}/pay", put(pay_checkout))
        .route("/api/checkout/{id}/finalize", post(finalize_checkout))
        .route("/api/orders/my-orders", get(my_orders))
        .route("/api/orders/{id}", get(order_details))
        .route("/api/upload", post(upload_image))
        // Admin
        .route("/api/admin/users", get(admin_users).post(admin_create_user))
        .route(
            "/api/admin/users/{id}",
            put(admin_update_user).delete(admin_delete_user),
        )
        .route(
            "/api/admin/products",
            get(admin_products).post(admin_create_product),
        )
        .route(
            "/api/admin/products/{id}",
            put(update_product).delete(admin_delete_product),
        )
        .route("/api/admin/orders", get(admin_orders))
        .route(
            "/api/admin/orders/{id}",
            put(admin_update_order).delete(admin_delete_order),
        )
        .layer(middleware::from_fn_with_state(shared.clone(), record))
        .with_state(shared)
}

/// Log every request and answer 500 on paths marked as failing.
async fn record(State(shared): State<Shared>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let failing = {
        let mut state = lock(&shared);
        state.requests.push(format!("{} {path}", request.method()));
        state.failing.iter().any(|prefix| path.starts_with(prefix.as_str()))
    };

    if failing {
        tracing::debug!(path = %path, "Injected failure");
        return Rejection(StatusCode::INTERNAL_SERVER_ERROR, "Injected failure").into_response();
    }
    next.run(request).await
}

// =============================================================================
// Auth
// =============================================================================

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticated(state: &BackendState, headers: &HeaderMap) -> Result<User, Rejection> {
    bearer(headers)
        .and_then(|token| state.user_for_token(token))
        .ok_or(Rejection(StatusCode::UNAUTHORIZED, "Not authorized, no token"))
}

fn admin(state: &BackendState, headers: &HeaderMap) -> Result<User, Rejection> {
    let user = authenticated(state, headers)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Rejection(StatusCode::FORBIDDEN, "Not authorized as an admin"))
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(shared): State<Shared>, Json(body): Json<LoginBody>) -> Reply<Value> {
    let mut state = lock(&shared);
    let user = state
        .account_by_email(&body.email)
        .filter(|account| account.password == body.password)
        .map(|account| account.user.clone())
        .ok_or(Rejection(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;
    let token = state.issue_token(&user.id);
    Ok(Json(json!({ "user": user, "token": token })))
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

async fn register(State(shared): State<Shared>, Json(body): Json<RegisterBody>) -> Created<Value> {
    let mut state = lock(&shared);
    if state.account_by_email(&body.email).is_some() {
        return Err(bad_request("User already exists"));
    }
    let email = Email::parse(&body.email).map_err(|_| bad_request("Invalid email"))?;
    let user = User {
        id: UserId::from(new_id()),
        name: body.name,
        email,
        role: Role::Customer,
    };
    state.accounts.push(Account {
        user: user.clone(),
        password: body.password,
    });
    let token = state.issue_token(&user.id);
    Ok((StatusCode::CREATED, Json(json!({ "user": user, "token": token }))))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartQuery {
    user_id: Option<String>,
    guest_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineBody {
    product_id: String,
    quantity: Option<u32>,
    size: Option<String>,
    color: Option<String>,
    user_id: Option<String>,
    guest_id: Option<String>,
}

impl LineBody {
    fn key(&self) -> LineKey {
        LineKey {
            product_id: ProductId::from(self.product_id.as_str()),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }
}

/// Cart owner: the user's cart when it exists, else the guest's, else a
/// new cart for whichever id was given (user first).
fn resolve_owner(
    state: &BackendState,
    user_id: Option<&str>,
    guest_id: Option<&str>,
) -> Result<String, Rejection> {
    let user = user_id.map(user_owner);
    let guest = guest_id.map(guest_owner);
    let existing = [&user, &guest]
        .into_iter()
        .flatten()
        .find(|owner| state.carts.contains_key(owner.as_str()));

    existing
        .cloned()
        .or(user)
        .or(guest)
        .ok_or_else(|| bad_request("userId or guestId is required"))
}

async fn fetch_cart(State(shared): State<Shared>, Query(query): Query<CartQuery>) -> Reply<Cart> {
    let state = lock(&shared);
    let owner = resolve_owner(&state, query.user_id.as_deref(), query.guest_id.as_deref())?;
    let lines = state.carts.get(&owner).map_or(&[][..], Vec::as_slice);
    Ok(Json(cart_of(lines)))
}

async fn add_to_cart(State(shared): State<Shared>, Json(body): Json<LineBody>) -> Reply<Cart> {
    let quantity = body
        .quantity
        .and_then(NonZeroU32::new)
        .ok_or_else(|| bad_request("Quantity must be at least 1"))?;

    let mut state = lock(&shared);
    let owner = resolve_owner(&state, body.user_id.as_deref(), body.guest_id.as_deref())?;
    let line = state
        .line_for(&body.product_id, quantity, body.size, body.color)
        .ok_or_else(|| not_found("Product not found"))?;

    let lines = state.carts.entry(owner).or_default();
    BackendState::add_line(lines, line);
    Ok(Json(cart_of(lines)))
}

async fn update_cart(State(shared): State<Shared>, Json(body): Json<LineBody>) -> Reply<Cart> {
    let key = body.key();
    let mut state = lock(&shared);
    let owner = resolve_owner(&state, body.user_id.as_deref(), body.guest_id.as_deref())?;
    let lines = state
        .carts
        .get_mut(&owner)
        .ok_or_else(|| not_found("Cart not found"))?;
    if !lines.iter().any(|line| line.key() == key) {
        return Err(not_found("Product not found in cart"));
    }

    match body.quantity.and_then(NonZeroU32::new) {
        Some(quantity) => lines
            .iter_mut()
            .filter(|line| line.key() == key)
            .for_each(|line| line.quantity = quantity),
        None => lines.retain(|line| line.key() != key),
    }
    Ok(Json(cart_of(lines)))
}

async fn remove_from_cart(State(shared): State<Shared>, Json(body): Json<LineBody>) -> Reply<Cart> {
    let key = body.key();
    let mut state = lock(&shared);
    let owner = resolve_owner(&state, body.user_id.as_deref(), body.guest_id.as_deref())?;
    let lines = state
        .carts
        .get_mut(&owner)
        .ok_or_else(|| not_found("Cart not found"))?;
    if !lines.iter().any(|line| line.key() == key) {
        return Err(not_found("Product not found in cart"));
    }
    lines.retain(|line| line.key() != key);
    Ok(Json(cart_of(lines)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergeBody {
    guest_id: String,
    user_id: String,
}

async fn merge_cart(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<MergeBody>,
) -> Reply<Cart> {
    let mut state = lock(&shared);
    let user = authenticated(&state, &headers)?;
    if user.id.as_str() != body.user_id {
        return Err(Rejection(StatusCode::FORBIDDEN, "Cannot merge into another user's cart"));
    }

    let guest_lines = state
        .carts
        .remove(&guest_owner(&body.guest_id))
        .filter(|lines| !lines.is_empty())
        .ok_or_else(|| not_found("Guest cart not found"))?;

    let lines = state.carts.entry(user_owner(&body.user_id)).or_default();
    for line in guest_lines {
        BackendState::add_line(lines, line);
    }
    Ok(Json(cart_of(lines)))
}

// =============================================================================
// Catalog
// =============================================================================

fn field_is(filter: Option<&String>, value: Option<&str>) -> bool {
    filter.is_none_or(|wanted| value.is_some_and(|value| value.eq_ignore_ascii_case(wanted)))
}

fn any_of(filter: Option<&String>, values: &[String]) -> bool {
    filter.is_none_or(|wanted| {
        wanted
            .split(',')
            .any(|w| values.iter().any(|value| value.eq_ignore_ascii_case(w)))
    })
}

fn price_bound(filter: Option<&String>, check: impl Fn(Decimal) -> bool) -> bool {
    filter
        .and_then(|raw| Decimal::from_str(raw).ok())
        .is_none_or(check)
}

fn matches_filters(product: &Product, query: &HashMap<String, String>) -> bool {
    let price = product.price.amount();
    field_is(query.get("category"), product.category.as_deref())
        && field_is(query.get("gender"), product.gender.as_deref())
        && any_of(query.get("color"), &product.colors)
        && any_of(query.get("size"), &product.sizes)
        && any_of(query.get("material"), product.material.as_slice())
        && any_of(query.get("brand"), product.brand.as_slice())
        && any_of(query.get("collection"), &product.collections)
        && price_bound(query.get("minPrice"), |min| price >= min)
        && price_bound(query.get("maxPrice"), |max| price <= max)
        && query.get("search").is_none_or(|term| {
            let term = term.to_lowercase();
            product.name.to_lowercase().contains(&term)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
        })
}

async fn list_products(
    State(shared): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply<Vec<Product>> {
    let state = lock(&shared);
    let mut products: Vec<Product> = state
        .products
        .iter()
        .filter(|product| matches_filters(product, &query))
        .cloned()
        .collect();

    match query.get("sortBy").map(String::as_str) {
        Some("priceAsc") => products.sort_by_key(|p| p.price),
        Some("priceDesc") => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
        _ => {}
    }
    if let Some(limit) = query.get("limit").and_then(|raw| raw.parse::<usize>().ok()) {
        products.truncate(limit);
    }
    Ok(Json(products))
}

async fn product_details(State(shared): State<Shared>, Path(id): Path<String>) -> Reply<Product> {
    lock(&shared)
        .product(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Product not found"))
}

async fn similar_products(
    State(shared): State<Shared>,
    Path(id): Path<String>,
) -> Reply<Vec<Product>> {
    let state = lock(&shared);
    let product = state.product(&id).ok_or_else(|| not_found("Product not found"))?;
    let similar = state
        .products
        .iter()
        .filter(|p| p.id != product.id && p.category == product.category)
        .take(4)
        .cloned()
        .collect();
    Ok(Json(similar))
}

async fn new_arrivals(State(shared): State<Shared>) -> Reply<Vec<Product>> {
    let state = lock(&shared);
    Ok(Json(state.products.iter().rev().take(8).cloned().collect()))
}

async fn best_seller(State(shared): State<Shared>) -> Reply<Product> {
    lock(&shared)
        .products
        .first()
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("No best seller found"))
}

fn apply_update(product: &mut Product, update: ProductUpdate) {
    if let Some(name) = update.name {
        product.name = name;
    }
    if let Some(price) = update.price {
        product.price = price;
    }
    if let Some(count) = update.count_in_stock {
        product.count_in_stock = count;
    }
    if let Some(sku) = update.sku {
        product.sku = sku;
    }
    if let Some(sizes) = update.sizes {
        product.sizes = sizes;
    }
    if let Some(colors) = update.colors {
        product.colors = colors;
    }
    if let Some(collections) = update.collections {
        product.collections = collections;
    }
    if let Some(images) = update.images {
        product.images = images;
    }
    product.description = update.description.or(product.description.take());
    product.category = update.category.or(product.category.take());
    product.brand = update.brand.or(product.brand.take());
    product.material = update.material.or(product.material.take());
    product.gender = update.gender.or(product.gender.take());
}

async fn update_product(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<ProductUpdate>,
) -> Reply<Product> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let product = state
        .products
        .iter_mut()
        .find(|p| p.id.as_str() == id)
        .ok_or_else(|| not_found("Product not found"))?;
    apply_update(product, update);
    Ok(Json(product.clone()))
}

// =============================================================================
// Checkout and orders
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    checkout_items: Vec<CheckoutItem>,
    shipping_address: ShippingAddress,
    payment_method: String,
    total_price: Price,
}

async fn create_checkout(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<CheckoutBody>,
) -> Created<Value> {
    let mut state = lock(&shared);
    let user = authenticated(&state, &headers)?;
    if body.checkout_items.is_empty() {
        return Err(bad_request("No items in checkout"));
    }

    let id = new_id();
    let created_at = Utc::now();
    let response = json!({
        "_id": id,
        "checkoutItems": body.checkout_items,
        "totalPrice": body.total_price,
        "createdAt": created_at,
    });
    state.checkouts.insert(
        id.clone(),
        StoredCheckout {
            id,
            owner: user.id,
            items: body.checkout_items,
            shipping_address: body.shipping_address,
            payment_method: body.payment_method,
            total_price: body.total_price,
            payment_details: None,
            finalized: false,
        },
    );
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayBody {
    payment_status: String,
    payment_details: Value,
}

async fn pay_checkout(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<PayBody>,
) -> Reply<Value> {
    let mut state = lock(&shared);
    let user = authenticated(&state, &headers)?;
    let checkout = state
        .checkouts
        .get_mut(&id)
        .filter(|checkout| checkout.owner == user.id)
        .ok_or_else(|| not_found("Checkout not found"))?;
    if body.payment_status != "paid" {
        return Err(bad_request("Invalid payment status"));
    }
    checkout.payment_details = Some(body.payment_details);
    Ok(Json(json!({ "_id": checkout.id, "isPaid": true })))
}

async fn finalize_checkout(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Created<Order> {
    let mut state = lock(&shared);
    let user = authenticated(&state, &headers)?;
    let checkout = state
        .checkouts
        .get_mut(&id)
        .filter(|checkout| checkout.owner == user.id)
        .ok_or_else(|| not_found("Checkout not found"))?;
    if checkout.payment_details.is_none() {
        return Err(bad_request("Checkout is not paid"));
    }
    if checkout.finalized {
        return Err(bad_request("Checkout already finalized"));
    }
    checkout.finalized = true;

    let order = Order {
        id: OrderId::from(new_id()),
        order_items: checkout.items.clone(),
        shipping_address: checkout.shipping_address.clone(),
        payment_method: checkout.payment_method.clone(),
        shipping_method: None,
        items_price: checkout.total_price,
        shipping_price: Price::ZERO,
        tax_price: Price::ZERO,
        total_price: checkout.total_price,
        is_paid: true,
        is_delivered: false,
        status: Some(OrderStatus::Processing),
        created_at: Utc::now(),
    };
    state.orders.push(StoredOrder {
        order: order.clone(),
        owner: user.id.clone(),
    });
    state.carts.remove(&user_owner(user.id.as_str()));
    Ok((StatusCode::CREATED, Json(order)))
}

async fn my_orders(State(shared): State<Shared>, headers: HeaderMap) -> Reply<Vec<Order>> {
    let state = lock(&shared);
    let user = authenticated(&state, &headers)?;
    let orders = state
        .orders
        .iter()
        .rev()
        .filter(|stored| stored.owner == user.id)
        .map(|stored| stored.order.clone())
        .collect();
    Ok(Json(orders))
}

async fn order_details(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Order> {
    let state = lock(&shared);
    let user = authenticated(&state, &headers)?;
    state
        .orders
        .iter()
        .find(|stored| stored.order.id.as_str() == id && (stored.owner == user.id || user.is_admin()))
        .map(|stored| Json(stored.order.clone()))
        .ok_or_else(|| not_found("Order not found"))
}

async fn upload_image(State(shared): State<Shared>, mut multipart: Multipart) -> Reply<Value> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| bad_request("Invalid upload"))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let bytes = field.bytes().await.map_err(|_| bad_request("Invalid upload"))?;
        if bytes.is_empty() {
            return Err(bad_request("Empty image"));
        }
        lock(&shared).uploads.push(file_name.clone());
        return Ok(Json(json!({ "imageUrl": format!("https://cdn.test/uploads/{file_name}") })));
    }
    Err(bad_request("No image uploaded"))
}

// =============================================================================
// Admin
// =============================================================================

async fn admin_users(State(shared): State<Shared>, headers: HeaderMap) -> Reply<Vec<User>> {
    let state = lock(&shared);
    admin(&state, &headers)?;
    Ok(Json(state.accounts.iter().map(|a| a.user.clone()).collect()))
}

#[derive(Deserialize)]
struct NewUserBody {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Role,
}

async fn admin_create_user(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewUserBody>,
) -> Created<Value> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    if state.account_by_email(&body.email).is_some() {
        return Err(bad_request("User already exists"));
    }
    let user = User {
        id: UserId::from(new_id()),
        name: body.name,
        email: Email::parse(&body.email).map_err(|_| bad_request("Invalid email"))?,
        role: body.role,
    };
    state.accounts.push(Account {
        user: user.clone(),
        password: body.password,
    });
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "user": user })),
    ))
}

#[derive(Deserialize)]
struct UserUpdateBody {
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
}

async fn admin_update_user(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UserUpdateBody>,
) -> Reply<Value> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|_| bad_request("Invalid email"))?;
    let account = state
        .accounts
        .iter_mut()
        .find(|a| a.user.id.as_str() == id)
        .ok_or_else(|| not_found("User not found"))?;

    if let Some(name) = body.name {
        account.user.name = name;
    }
    if let Some(email) = email {
        account.user.email = email;
    }
    if let Some(role) = body.role {
        account.user.role = role;
    }
    Ok(Json(json!({ "message": "User updated successfully", "user": account.user })))
}

async fn admin_delete_user(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let before = state.accounts.len();
    state.accounts.retain(|a| a.user.id.as_str() != id);
    if state.accounts.len() == before {
        return Err(not_found("User not found"));
    }
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

async fn admin_products(State(shared): State<Shared>, headers: HeaderMap) -> Reply<Vec<Product>> {
    let state = lock(&shared);
    admin(&state, &headers)?;
    Ok(Json(state.products.clone()))
}

async fn admin_create_product(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewProduct>,
) -> Created<Product> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let product = Product {
        id: ProductId::from(new_id()),
        name: body.name,
        price: body.price,
        discount_price: None,
        description: body.description,
        brand: body.brand,
        material: None,
        sizes: Vec::new(),
        colors: Vec::new(),
        images: Vec::new(),
        category: body.category,
        gender: None,
        collections: Vec::new(),
        is_published: false,
        is_featured: false,
        sku: body.sku,
        count_in_stock: body.count_in_stock,
    };
    state.products.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn admin_delete_product(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let before = state.products.len();
    state.products.retain(|p| p.id.as_str() != id);
    if state.products.len() == before {
        return Err(not_found("Product not found"));
    }
    Ok(Json(json!({ "message": "Product removed" })))
}

fn admin_order(state: &BackendState, stored: &StoredOrder) -> AdminOrder {
    let name = state
        .accounts
        .iter()
        .find(|a| a.user.id == stored.owner)
        .map(|a| a.user.name.clone())
        .unwrap_or_default();
    AdminOrder {
        id: stored.order.id.clone(),
        user: Some(OrderCustomer { name }),
        total_price: stored.order.total_price,
        status: stored.order.status.unwrap_or_default(),
    }
}

async fn admin_orders(State(shared): State<Shared>, headers: HeaderMap) -> Reply<Vec<AdminOrder>> {
    let state = lock(&shared);
    admin(&state, &headers)?;
    Ok(Json(
        state
            .orders
            .iter()
            .map(|stored| admin_order(&state, stored))
            .collect(),
    ))
}

#[derive(Deserialize)]
struct StatusBody {
    status: OrderStatus,
}

async fn admin_update_order(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Reply<AdminOrder> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let stored = state
        .set_order_status(&id, body.status)
        .cloned()
        .ok_or_else(|| not_found("Order not found"))?;
    Ok(Json(admin_order(&state, &stored)))
}

async fn admin_delete_order(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    let mut state = lock(&shared);
    admin(&state, &headers)?;
    let before = state.orders.len();
    state.orders.retain(|stored| stored.order.id.as_str() != id);
    if state.orders.len() == before {
        return Err(not_found("Order not found"));
    }
    Ok(Json(json!({ "message": "Order removed" })))
}
