//! Admin console tests against the mock backend.

use std::num::NonZeroU32;

use serde_json::json;
use the_wind_admin::{AdminConsole, AdminError};
use the_wind_core::{
    Email, LineKey, NewProduct, NewUser, OrderStatus, Price, ProductId, ProductUpdate, Role,
    ShippingAddress, UserUpdate,
};
use the_wind_integration_tests::{MockBackend, SHOPPER_EMAIL, SHOPPER_PASSWORD};

fn email(raw: &str) -> Email {
    Email::parse(raw).expect("valid email")
}

/// Place one order as the seeded shopper and return its total.
async fn place_order(backend: &MockBackend) -> Price {
    let shopper = backend.signed_in(SHOPPER_EMAIL, SHOPPER_PASSWORD).await;
    shopper
        .add_to_cart(
            &LineKey::new("P3").with_size("M"),
            NonZeroU32::new(1).expect("non-zero"),
        )
        .await
        .expect("add");
    shopper
        .begin_checkout(ShippingAddress {
            address: "2 Quay Street".to_string(),
            city: "Auckland".to_string(),
            postal_code: "1010".to_string(),
            country: "New Zealand".to_string(),
        })
        .await
        .expect("create");
    let confirmation = shopper
        .complete_payment(&json!({ "id": "CAPTURE-2" }))
        .await
        .expect("complete");
    confirmation.order.total_price
}

// =============================================================================
// Console Guard Tests
// =============================================================================

#[tokio::test]
async fn test_console_refuses_anonymous_and_customers() {
    let backend = MockBackend::spawn().await;

    let anonymous = backend.storefront();
    assert!(matches!(
        AdminConsole::require(anonymous.session(), anonymous.api().clone()),
        Err(AdminError::Unauthorized)
    ));

    let shopper = backend.signed_in(SHOPPER_EMAIL, SHOPPER_PASSWORD).await;
    assert!(matches!(
        AdminConsole::require(shopper.session(), shopper.api().clone()),
        Err(AdminError::Forbidden { .. })
    ));
    assert!(AdminConsole::open(shopper.session(), shopper.api().clone()).is_none());
}

#[tokio::test]
async fn test_backend_still_enforces_admin_role() {
    let backend = MockBackend::spawn().await;
    let (storefront, console) = backend.admin_console().await;

    // Demote the admin server-side; the client still shows the console.
    backend.with_state(|state| {
        for account in &mut state.accounts {
            account.user.role = Role::Customer;
        }
    });
    assert!(storefront.session().is_admin());

    let err = console.users().fetch_all().await.expect_err("forbidden");
    assert_eq!(err.to_string(), "Failed to fetch users");
    assert_eq!(err.source.status().map(|s| s.as_u16()), Some(403));
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_crud() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;
    let users = console.users();

    let listed = users.fetch_all().await.expect("list");
    assert_eq!(listed.len(), 2);

    let created = users
        .create(&NewUser {
            name: "Grace".to_string(),
            email: email("grace@example.com"),
            password: "secret1".to_string(),
            role: Role::Customer,
        })
        .await
        .expect("create");
    assert_eq!(users.snapshot().items.len(), 3);

    let updated = users
        .update(
            &created.id,
            &UserUpdate {
                name: "Grace H".to_string(),
                email: email("grace@example.com"),
                role: Role::Admin,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.role, Role::Admin);
    let state = users.snapshot();
    assert_eq!(state.items.len(), 3);
    assert!(state.items.contains(&updated));

    users.delete(&created.id).await.expect("delete");
    assert_eq!(users.snapshot().items.len(), 2);
    assert!(backend.inspect(|state| state.account_by_email("grace@example.com").is_none()));
}

#[tokio::test]
async fn test_failed_user_create_keeps_list() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;
    let users = console.users();
    let before = users.fetch_all().await.expect("list");

    let err = users
        .create(&NewUser {
            name: "Dup".to_string(),
            email: email(SHOPPER_EMAIL),
            password: "secret1".to_string(),
            role: Role::Customer,
        })
        .await
        .expect_err("duplicate");

    assert_eq!(err.to_string(), "Failed to add user");
    let state = users.snapshot();
    assert_eq!(state.items, before);
    assert_eq!(state.status.error.as_deref(), Some("Failed to add user"));
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;
    let products = console.products();
    products.fetch_all().await.expect("list");

    let created = products
        .create(&NewProduct {
            name: "Storm Jacket".to_string(),
            price: Price::from_cents(18_900),
            count_in_stock: 3,
            sku: "SKU-STORM".to_string(),
            description: Some("Waterproof".to_string()),
            category: Some("Top Wear".to_string()),
            brand: Some("Wind".to_string()),
        })
        .await
        .expect("create");
    assert_eq!(products.snapshot().items.len(), 6);
    assert_eq!(products.find(&created.id), Some(created.clone()));

    let mut update = ProductUpdate::from_product(&created);
    update.count_in_stock = Some(0);
    let updated = products.update(&created.id, &update).await.expect("update");
    assert_eq!(updated.count_in_stock, 0);
    assert_eq!(products.find(&created.id), Some(updated));

    products.delete(&created.id).await.expect("delete");
    assert!(products.find(&created.id).is_none());
    assert_eq!(
        backend.request_count(&format!("DELETE /api/admin/products/{}", created.id)),
        1
    );
}

#[tokio::test]
async fn test_attach_uploaded_image_then_save() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;
    let products = console.products();
    products.fetch_all().await.expect("list");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("runner-side.png");
    std::fs::write(&path, b"\x89PNG fake image").expect("write image");

    let id = ProductId::from("P1");
    let mut update = ProductUpdate::from_product(&products.find(&id).expect("seeded"));
    let url = products
        .attach_image(&mut update, &path)
        .await
        .expect("upload");
    assert_eq!(url, "https://cdn.test/uploads/runner-side.png");

    let saved = products.update(&id, &update).await.expect("save");
    assert_eq!(saved.images.len(), 2);
    assert_eq!(saved.images[1].url, url);
    assert_eq!(backend.inspect(|state| state.uploads.clone()), ["runner-side.png"]);
}

#[tokio::test]
async fn test_failed_upload_leaves_update_untouched() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;
    let products = console.products();

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("shoe.jpg");
    std::fs::write(&path, b"jpeg bytes").expect("write image");

    backend.fail("/api/upload");
    let mut update = ProductUpdate::default();
    let err = products
        .attach_image(&mut update, &path)
        .await
        .expect_err("upload fails");

    assert_eq!(err.to_string(), "Failed to upload image");
    assert_eq!(update, ProductUpdate::default());
}

#[tokio::test]
async fn test_upload_returns_hosted_url() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;

    let url = console
        .api()
        .upload_image("banner.webp", b"webp bytes".to_vec())
        .await
        .expect("upload");
    assert_eq!(url, "https://cdn.test/uploads/banner.webp");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_orders_dashboard_totals() {
    let backend = MockBackend::spawn().await;
    let first = place_order(&backend).await;
    let second = place_order(&backend).await;

    let (_storefront, console) = backend.admin_console().await;
    let orders = console.orders();
    let listed = orders.fetch_all().await.expect("list");

    let state = orders.snapshot();
    assert_eq!(listed.len(), 2);
    assert_eq!(state.total_orders, 2);
    assert_eq!(state.total_sales, first + second);
    assert_eq!(
        listed[0].user.as_ref().map(|u| u.name.as_str()),
        Some("Shopper")
    );
}

#[tokio::test]
async fn test_order_status_and_delete() {
    let backend = MockBackend::spawn().await;
    place_order(&backend).await;

    let (_storefront, console) = backend.admin_console().await;
    let orders = console.orders();
    let listed = orders.fetch_all().await.expect("list");
    let id = listed[0].id.clone();

    let updated = orders
        .update_status(&id, OrderStatus::Delivered)
        .await
        .expect("status");
    assert_eq!(updated.status, OrderStatus::Delivered);
    assert_eq!(orders.snapshot().orders[0].status, OrderStatus::Delivered);
    assert!(backend.inspect(|state| state.orders[0].order.is_delivered));

    orders.delete(&id).await.expect("delete");
    assert!(orders.snapshot().orders.is_empty());
    assert!(backend.inspect(|state| state.orders.is_empty()));
}

#[tokio::test]
async fn test_unknown_product_delete_keeps_list() {
    let backend = MockBackend::spawn().await;
    let (_storefront, console) = backend.admin_console().await;
    let products = console.products();
    let before = products.fetch_all().await.expect("list");

    let err = products
        .delete(&ProductId::from("NOPE"))
        .await
        .expect_err("unknown id");

    assert_eq!(err.to_string(), "Failed to delete product");
    assert_eq!(products.snapshot().items, before);
}
