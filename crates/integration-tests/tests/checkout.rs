//! Checkout flow and order history against the mock backend.
//!
//! The flow is linear: no-checkout → created → paid → finalized. A failed
//! step halts it where it stands and keeps the cart.

use std::num::NonZeroU32;

use chrono::Duration;
use serde_json::json;
use the_wind_core::order::DELIVERY_ESTIMATE_DAYS;
use the_wind_core::{LineKey, OrderStatus, Price, ShippingAddress};
use the_wind_integration_tests::{MockBackend, SHOPPER_EMAIL, SHOPPER_PASSWORD, TEST_PAYPAL_CLIENT_ID};
use the_wind_storefront::payment::PresetApproval;
use the_wind_storefront::storage::{MemoryStore, SharedStore, keys};
use the_wind_storefront::{CheckoutError, CheckoutStage, Storefront};

fn address() -> ShippingAddress {
    ShippingAddress {
        address: "1 Harbour Road".to_string(),
        city: "Wellington".to_string(),
        postal_code: "6011".to_string(),
        country: "New Zealand".to_string(),
    }
}

fn capture() -> serde_json::Value {
    json!({ "id": "CAPTURE-1", "status": "COMPLETED" })
}

/// Signed-in shopper with two Trail Runners in the cart.
async fn shopper_with_cart(backend: &MockBackend, store: SharedStore) -> Storefront {
    let storefront = backend.storefront_with(store);
    storefront
        .sign_in(
            SHOPPER_EMAIL,
            &secrecy::SecretString::from(SHOPPER_PASSWORD.to_string()),
            None,
        )
        .await
        .expect("login");
    storefront
        .add_to_cart(
            &LineKey::new("P1").with_size("10").with_color("Red"),
            NonZeroU32::new(2).expect("non-zero"),
        )
        .await
        .expect("add");
    storefront
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn test_checkout_end_to_end() {
    let backend = MockBackend::spawn().await;
    let store: SharedStore = MemoryStore::shared();
    let storefront = shopper_with_cart(&backend, store.clone()).await;
    let cart_total = storefront.cart().cart().total_price;
    assert_eq!(cart_total, Price::from_cents(9998));

    let checkout = storefront
        .begin_checkout(address())
        .await
        .expect("create checkout");
    assert_eq!(checkout.total_price, cart_total);
    assert_eq!(checkout.checkout_items.len(), 1);
    assert_eq!(checkout.checkout_items[0].quantity, 2);
    assert_eq!(storefront.checkout().stage(), CheckoutStage::Created);

    let button = storefront.checkout().payment_button().expect("button");
    assert_eq!(button.client_id, TEST_PAYPAL_CLIENT_ID);
    assert_eq!(button.amount, "99.98");

    let confirmation = storefront
        .pay_with(&PresetApproval::new(capture()))
        .await
        .expect("pay and finalize");

    let order = &confirmation.order;
    assert_eq!(order.total_price, cart_total);
    assert!(order.is_paid);
    assert_eq!(order.shipping_address, address());
    assert_eq!(
        confirmation.estimated_delivery,
        order.created_at + Duration::days(DELIVERY_ESTIMATE_DAYS)
    );
    // The flow is ready for the next purchase.
    assert_eq!(storefront.checkout().stage(), CheckoutStage::NoCheckout);

    // Cart is gone everywhere.
    assert!(storefront.cart().cart().is_empty());
    assert_eq!(store.get(keys::CART).expect("readable"), None);
    let user_id = storefront.session().user().expect("signed in").id;
    assert!(backend.inspect(|state| !state.carts.contains_key(&format!("user:{user_id}"))));

    // The backend kept the capture payload verbatim.
    let details = backend.inspect(|state| {
        state
            .checkouts
            .values()
            .find_map(|checkout| checkout.payment_details.clone())
    });
    assert_eq!(details, Some(capture()));
}

#[tokio::test]
async fn test_order_history_after_checkout() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;
    storefront.begin_checkout(address()).await.expect("create");
    let confirmation = storefront
        .complete_payment(&capture())
        .await
        .expect("complete");

    let orders = storefront.orders();
    let mine = orders.fetch_my_orders().await.expect("my orders");
    assert_eq!(mine.len(), 1);
    assert_eq!(orders.snapshot().total_orders, 1);

    let details = orders
        .fetch_order_details(&confirmation.order.id)
        .await
        .expect("details");
    assert_eq!(details, confirmation.order);
    assert_eq!(details.status, Some(OrderStatus::Processing));
    assert_eq!(orders.snapshot().order_details, Some(details));
}

// =============================================================================
// Guard Tests
// =============================================================================

#[tokio::test]
async fn test_empty_cart_sends_nothing() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.signed_in(SHOPPER_EMAIL, SHOPPER_PASSWORD).await;

    let err = storefront
        .begin_checkout(address())
        .await
        .expect_err("empty cart");

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert_eq!(backend.request_count("POST /api/checkout"), 0);
    assert_eq!(storefront.checkout().stage(), CheckoutStage::NoCheckout);
}

#[tokio::test]
async fn test_guest_checkout_is_rejected() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.storefront();
    storefront
        .add_to_cart(&LineKey::new("P2").with_size("7"), NonZeroU32::MIN)
        .await
        .expect("add");

    let err = storefront
        .begin_checkout(address())
        .await
        .expect_err("no token");

    assert_eq!(err.to_string(), "Checkout failed");
    assert_eq!(backend.request_count("POST /api/checkout"), 0);
    assert_eq!(storefront.checkout().stage(), CheckoutStage::NoCheckout);
}

#[tokio::test]
async fn test_steps_out_of_order_are_refused() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;

    let err = storefront
        .checkout()
        .finalize()
        .await
        .expect_err("nothing to finalize");
    assert!(matches!(
        err,
        CheckoutError::InvalidTransition {
            from: CheckoutStage::NoCheckout,
            ..
        }
    ));

    storefront.begin_checkout(address()).await.expect("create");
    storefront.checkout().pay(&capture()).await.expect("pay");
    let err = storefront
        .begin_checkout(address())
        .await
        .expect_err("paid checkout awaits finalization");
    assert!(matches!(
        err,
        CheckoutError::InvalidTransition {
            from: CheckoutStage::Paid,
            ..
        }
    ));
    assert_eq!(backend.request_count("POST /api/checkout"), 1);
}

// =============================================================================
// Re-entry Tests
// =============================================================================

#[tokio::test]
async fn test_second_purchase_in_same_session() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;
    storefront.begin_checkout(address()).await.expect("create");
    let first = storefront
        .complete_payment(&capture())
        .await
        .expect("first purchase");

    storefront
        .add_to_cart(&LineKey::new("P2").with_size("8"), NonZeroU32::MIN)
        .await
        .expect("add");
    let checkout = storefront
        .begin_checkout(address())
        .await
        .expect("second checkout");
    assert_eq!(checkout.checkout_items.len(), 1);

    let second = storefront
        .complete_payment(&capture())
        .await
        .expect("second purchase");
    assert_ne!(first.order.id, second.order.id);
    assert!(backend.inspect(|state| state.orders.len() == 2));
}

#[tokio::test]
async fn test_abandoned_checkout_is_replaced() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;
    let abandoned = storefront.begin_checkout(address()).await.expect("create");

    let fresh = storefront
        .begin_checkout(address())
        .await
        .expect("re-enter checkout");

    assert_ne!(fresh.id, abandoned.id);
    assert_eq!(storefront.checkout().stage(), CheckoutStage::Created);
    assert_eq!(
        storefront.checkout().snapshot().checkout.map(|c| c.id),
        Some(fresh.id.clone())
    );
    storefront
        .complete_payment(&capture())
        .await
        .expect("pays the fresh checkout");
    assert_eq!(
        backend.request_count(&format!("PUT /api/checkout/{}/pay", fresh.id)),
        1
    );
    assert_eq!(
        backend.request_count(&format!("PUT /api/checkout/{}/pay", abandoned.id)),
        0
    );
}

// =============================================================================
// Failure Tests
// =============================================================================

#[tokio::test]
async fn test_failed_payment_keeps_checkout_and_cart() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;
    let cart = storefront.cart().cart();
    storefront.begin_checkout(address()).await.expect("create");

    backend.fail("/api/checkout");
    let err = storefront
        .complete_payment(&capture())
        .await
        .expect_err("payment fails");

    assert!(matches!(err, CheckoutError::Pay(_)));
    assert_eq!(err.to_string(), "Payment processing failed. Please try again.");
    assert_eq!(storefront.checkout().stage(), CheckoutStage::Created);
    assert_eq!(storefront.cart().cart(), cart);
    assert_eq!(backend.request_count("POST /api/checkout/"), 0);

    // Retrying from the same stage works once the backend recovers.
    backend.heal();
    storefront
        .complete_payment(&capture())
        .await
        .expect("retry succeeds");
    assert!(storefront.cart().cart().is_empty());
}

#[tokio::test]
async fn test_failed_finalize_stays_paid() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;
    let checkout = storefront.begin_checkout(address()).await.expect("create");
    storefront.checkout().pay(&capture()).await.expect("pay");

    backend.fail(&format!("/api/checkout/{}/finalize", checkout.id));
    let err = storefront
        .checkout()
        .finalize()
        .await
        .expect_err("finalize fails");

    assert_eq!(err.to_string(), "Order finalization failed.");
    assert_eq!(storefront.checkout().stage(), CheckoutStage::Paid);
    assert!(!storefront.cart().cart().is_empty());
    assert!(backend.inspect(|state| state.orders.is_empty()));
}

#[tokio::test]
async fn test_reset_starts_over() {
    let backend = MockBackend::spawn().await;
    let storefront = shopper_with_cart(&backend, MemoryStore::shared()).await;
    storefront.begin_checkout(address()).await.expect("create");

    storefront.checkout().reset();

    let state = storefront.checkout().snapshot();
    assert_eq!(state.stage, CheckoutStage::NoCheckout);
    assert!(state.checkout.is_none());
    storefront
        .begin_checkout(address())
        .await
        .expect("a new checkout");
}
