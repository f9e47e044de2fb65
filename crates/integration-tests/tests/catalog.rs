//! Catalog, filter and product page tests against the mock backend.

use the_wind_core::{FilterField, Filters, Product, ProductId, ProductUpdate, SortKey};
use the_wind_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, MockBackend};
use the_wind_storefront::containers::collection_filters;
use url::Url;

fn ids(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

// =============================================================================
// Filter Tests
// =============================================================================

#[tokio::test]
async fn test_fetch_by_category_and_gender() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let mut filters = Filters::default();
    filters.set(FilterField::Category, "Footwear");
    filters.set(FilterField::Gender, "Men");

    let products = catalog
        .fetch_by_filters(&filters, None)
        .await
        .expect("fetch");
    assert_eq!(ids(&products), ["P1", "P5"]);
    assert_eq!(catalog.snapshot().products, products);
    assert!(
        backend
            .requests()
            .iter()
            .any(|r| r == "GET /api/products")
    );
}

#[tokio::test]
async fn test_price_range_sort_and_limit() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let mut filters = Filters::default();
    filters.set(FilterField::MinPrice, "50");
    filters.set(FilterField::MaxPrice, "130");
    filters.sort_by = Some(SortKey::PriceDesc);

    let products = catalog
        .fetch_by_filters(&filters, None)
        .await
        .expect("fetch");
    assert_eq!(ids(&products), ["P3", "P4", "P2"]);

    let limited = catalog
        .fetch_by_filters(&filters, Some(1))
        .await
        .expect("fetch");
    assert_eq!(ids(&limited), ["P3"]);
}

#[tokio::test]
async fn test_list_filters_match_any_value() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    assert!(catalog.toggle_filter(FilterField::Size, "8"));
    assert!(catalog.toggle_filter(FilterField::Size, "S"));

    let products = catalog.fetch_current().await.expect("fetch");
    assert_eq!(ids(&products), ["P2", "P3"]);
}

#[tokio::test]
async fn test_collection_all_means_no_collection_filter() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let filters = collection_filters(Some("all"), "category=Top+Wear");
    assert_eq!(filters.get(FilterField::Collection), None);

    let products = catalog
        .fetch_by_filters(&filters, None)
        .await
        .expect("fetch");
    assert_eq!(ids(&products), ["P3", "P4"]);
}

#[tokio::test]
async fn test_search_replaces_term_and_fetches() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let products = catalog.search("boot").await.expect("search");
    assert_eq!(ids(&products), ["P5"]);
    assert_eq!(catalog.filters().get(FilterField::Search).as_deref(), Some("boot"));
}

#[tokio::test]
async fn test_filters_round_trip_through_page_url() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let page = Url::parse("http://shop.test/collections/all?gender=Women&size=8,9")
        .expect("page url");
    catalog.sync_from_url(&page);
    assert_eq!(catalog.filters().get(FilterField::Gender).as_deref(), Some("Women"));

    let products = catalog.fetch_current().await.expect("fetch");
    assert_eq!(ids(&products), ["P2"]);

    catalog.set_filter(FilterField::Gender, "");
    let mut next = page.clone();
    catalog.write_url(&mut next);
    assert_eq!(Filters::from_url(&next), catalog.filters());
    assert_eq!(Filters::from_url(&next).get(FilterField::Gender), None);

    catalog.clear_filters();
    assert!(catalog.filters().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_list() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();
    let before = catalog.fetch_current().await.expect("fetch");
    assert_eq!(before.len(), 5);

    backend.fail("/api/products");
    let err = catalog.fetch_current().await.expect_err("failing");

    assert_eq!(err.to_string(), "Failed to fetch products");
    let state = catalog.snapshot();
    assert_eq!(state.products, before);
    assert_eq!(state.status.error.as_deref(), Some("Failed to fetch products"));
}

// =============================================================================
// Product Page Tests
// =============================================================================

#[tokio::test]
async fn test_details_load_similar_products() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let product = catalog
        .fetch_details(&ProductId::from("P1"))
        .await
        .expect("details");

    let state = catalog.snapshot();
    assert_eq!(product.name, "Trail Runner");
    assert_eq!(state.selected_product, Some(product));
    assert_eq!(ids(&state.similar_products), ["P2", "P5"]);
}

#[tokio::test]
async fn test_details_survive_failed_similar_call() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    backend.fail("/api/products/similar");
    let product = catalog
        .fetch_details(&ProductId::from("P3"))
        .await
        .expect("details still load");

    assert_eq!(product.id.as_str(), "P3");
    assert!(catalog.snapshot().similar_products.is_empty());
}

#[tokio::test]
async fn test_new_arrivals_and_best_seller() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let arrivals = catalog.fetch_new_arrivals().await.expect("arrivals");
    assert_eq!(arrivals.first().map(|p| p.id.as_str()), Some("P5"));

    let best = catalog.fetch_best_seller().await.expect("best seller");
    assert_eq!(best.id.as_str(), "P1");

    let state = catalog.snapshot();
    assert_eq!(state.new_arrivals, arrivals);
    assert_eq!(state.best_seller, Some(best));
}

#[tokio::test]
async fn test_admin_product_edit_splices_into_list() {
    let backend = MockBackend::spawn().await;
    let storefront = backend.signed_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let catalog = storefront.catalog();
    catalog.fetch_current().await.expect("fetch");

    let update = ProductUpdate {
        name: Some("Trail Runner II".to_string()),
        ..ProductUpdate::default()
    };
    let product = catalog
        .update_product(&ProductId::from("P1"), &update)
        .await
        .expect("update");

    assert_eq!(product.name, "Trail Runner II");
    let state = catalog.snapshot();
    assert_eq!(state.products[0].name, "Trail Runner II");
    assert_eq!(state.products.len(), 5);
}

#[tokio::test]
async fn test_product_edit_requires_admin() {
    let backend = MockBackend::spawn().await;
    let catalog = backend.storefront().catalog().clone();

    let err = catalog
        .update_product(&ProductId::from("P1"), &ProductUpdate::default())
        .await
        .expect_err("anonymous edit");
    assert_eq!(err.to_string(), "Failed to update product");
}
