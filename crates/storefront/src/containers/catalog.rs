//! Catalog and filter state container.

use std::sync::Arc;

use the_wind_core::{FilterField, Filters, Product, ProductId, ProductUpdate, SortKey};
use tracing::{instrument, warn};
use url::Url;

use super::{RequestStatus, StateCell, Tracked};
use crate::api::ApiClient;
use crate::error::{Operation, OperationError};

/// Collection route segment that means "no collection filter".
const ALL_COLLECTIONS: &str = "all";

/// Snapshot of the catalog slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub products: Vec<Product>,
    pub selected_product: Option<Product>,
    pub similar_products: Vec<Product>,
    pub new_arrivals: Vec<Product>,
    pub best_seller: Option<Product>,
    pub filters: Filters,
    pub status: RequestStatus,
}

impl Tracked for CatalogState {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Filters for a collection page: the page query plus the collection
/// route segment, unless that segment is `all`.
#[must_use]
pub fn collection_filters(collection: Option<&str>, query: &str) -> Filters {
    let mut filters = Filters::from_query(query);
    if let Some(name) = collection.filter(|name| !name.is_empty() && *name != ALL_COLLECTIONS) {
        filters.set(FilterField::Collection, name);
    }
    filters
}

/// Holds the product list, the product being viewed and the filter record.
///
/// The filter record mirrors the page URL: [`Self::sync_from_url`] reads
/// it on navigation and [`Self::write_url`] pushes edits back.
#[derive(Clone)]
pub struct CatalogContainer {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    state: StateCell<CatalogState>,
}

impl CatalogContainer {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                api,
                state: StateCell::new(CatalogState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.inner.state.snapshot()
    }

    #[must_use]
    pub fn filters(&self) -> Filters {
        self.inner.state.read(|state| state.filters.clone())
    }

    /// Load the product list matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch products` and keeps the previous list.
    #[instrument(skip(self, filters), fields(query = %filters))]
    pub async fn fetch_by_filters(
        &self,
        filters: &Filters,
        limit: Option<u32>,
    ) -> Result<Vec<Product>, OperationError> {
        let call = self.inner.api.fetch_products(filters, limit);
        self.inner
            .state
            .track(Operation::FetchProducts, call, |state, products| {
                state.products = products.clone();
                products
            })
            .await
    }

    /// Load the product list for the current filter record.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch products` and keeps the previous list.
    pub async fn fetch_current(&self) -> Result<Vec<Product>, OperationError> {
        let filters = self.filters();
        self.fetch_by_filters(&filters, None).await
    }

    /// Search bar: record the search term and fetch by it alone.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch products` and keeps the previous list.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, OperationError> {
        let mut query = Filters::default();
        query.set(FilterField::Search, term);
        self.set_filters(&query);
        self.fetch_by_filters(&query, None).await
    }

    /// Load one product, and its similar products alongside.
    ///
    /// The two calls are independent: a failed similar-products call is
    /// logged and recorded in state but does not fail this one.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch product details` and keeps the previous
    /// selection.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_details(&self, id: &ProductId) -> Result<Product, OperationError> {
        let details = self.inner.state.track(
            Operation::FetchProductDetails,
            self.inner.api.fetch_product(id),
            |state, product| {
                state.selected_product = Some(product.clone());
                product
            },
        );
        let (product, similar) = tokio::join!(details, self.fetch_similar(id));

        if let Err(e) = similar {
            warn!(error = %e.source, "{e}");
        }
        product
    }

    /// Load products similar to `id`.
    ///
    /// # Errors
    ///
    /// Returns `Failed to fetch similar products` and keeps the previous
    /// list.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_similar(&self, id: &ProductId) -> Result<Vec<Product>, OperationError> {
        let call = self.inner.api.fetch_similar_products(id);
        self.inner
            .state
            .track(Operation::FetchSimilarProducts, call, |state, products| {
                state.similar_products = products.clone();
                products
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to fetch new arrivals` and keeps the previous list.
    pub async fn fetch_new_arrivals(&self) -> Result<Vec<Product>, OperationError> {
        let call = self.inner.api.fetch_new_arrivals();
        self.inner
            .state
            .track(Operation::FetchNewArrivals, call, |state, products| {
                state.new_arrivals = products.clone();
                products
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to load best seller product` and keeps the previous
    /// one.
    pub async fn fetch_best_seller(&self) -> Result<Product, OperationError> {
        let call = self.inner.api.fetch_best_seller();
        self.inner
            .state
            .track(Operation::FetchBestSeller, call, |state, product| {
                state.best_seller = Some(product.clone());
                product
            })
            .await
    }

    /// Save a product edit and splice the result into the list by id.
    ///
    /// # Errors
    ///
    /// Returns `Failed to update product` and leaves the list unchanged.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, OperationError> {
        let call = self.inner.api.update_product(id, update);
        self.inner
            .state
            .track(Operation::UpdateProduct, call, |state, product| {
                if let Some(slot) = state.products.iter_mut().find(|p| p.id == product.id) {
                    *slot = product.clone();
                }
                if let Some(selected) = state
                    .selected_product
                    .as_mut()
                    .filter(|selected| selected.id == product.id)
                {
                    *selected = product.clone();
                }
                product
            })
            .await
    }

    // =========================================================================
    // Filter editing
    // =========================================================================

    /// Replace the filter record with the one carried by `url`.
    pub fn sync_from_url(&self, url: &Url) {
        let filters = Filters::from_url(url);
        self.inner.state.update(|state| state.filters = filters);
    }

    /// Write the filter record into the query of `url`.
    pub fn write_url(&self, url: &mut Url) {
        self.inner.state.read(|state| state.filters.apply_to_url(url));
    }

    /// Overlay the non-empty fields of `patch`.
    pub fn set_filters(&self, patch: &Filters) {
        self.edit(|filters| filters.merge(patch));
    }

    pub fn clear_filters(&self) {
        self.edit(|filters| *filters = Filters::default());
    }

    /// Set one field; an empty value clears it.
    pub fn set_filter(&self, field: FilterField, value: &str) {
        self.edit(|filters| filters.set(field, value));
    }

    /// Checkbox toggle for list fields, radio select for scalars.
    /// Returns whether `value` is selected afterwards.
    pub fn toggle_filter(&self, field: FilterField, value: &str) -> bool {
        self.edit(|filters| filters.toggle(field, value))
    }

    pub fn set_max_price(&self, max: u32) {
        self.edit(|filters| filters.set_max_price(max));
    }

    pub fn set_sort(&self, sort: Option<SortKey>) {
        self.edit(|filters| filters.sort_by = sort);
    }

    fn edit<R>(&self, f: impl FnOnce(&mut Filters) -> R) -> R {
        self.inner.state.update(|state| f(&mut state.filters))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    fn catalog() -> CatalogContainer {
        let config = StorefrontConfig::for_backend("http://127.0.0.1:9", ".wind-test").unwrap();
        CatalogContainer::new(ApiClient::new(&config, MemoryStore::shared()).unwrap())
    }

    #[test]
    fn test_collection_filters() {
        let filters = collection_filters(Some("summer"), "?gender=Women");
        assert_eq!(filters.to_query(), "gender=Women&collection=summer");

        let filters = collection_filters(Some("all"), "gender=Women");
        assert!(filters.collection.is_none());

        let filters = collection_filters(None, "");
        assert!(filters.is_empty());
    }

    #[test]
    fn test_url_sync_round_trip() {
        let catalog = catalog();
        let page = Url::parse("https://shop.example/collections/all?size=9%2C11&brand=Acme").unwrap();
        catalog.sync_from_url(&page);
        assert_eq!(catalog.filters().size, vec!["9", "11"]);

        catalog.toggle_filter(FilterField::Size, "11");
        catalog.set_filter(FilterField::Color, "Black");
        catalog.set_sort(Some(SortKey::PriceAsc));

        let mut url = page.clone();
        catalog.write_url(&mut url);
        assert_eq!(url.query(), Some("color=Black&size=9&brand=Acme&sortBy=priceAsc"));

        let reread = self::catalog();
        reread.sync_from_url(&url);
        assert_eq!(reread.filters(), catalog.filters());
    }

    #[test]
    fn test_clear_filters_empties_url_query() {
        let catalog = catalog();
        catalog.set_max_price(150);
        assert_eq!(catalog.filters().max_price.as_deref(), Some("150"));

        catalog.clear_filters();
        let mut url = Url::parse("https://shop.example/collections/all?maxPrice=150").unwrap();
        catalog.write_url(&mut url);
        assert_eq!(url.query(), None);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_products() {
        let catalog = catalog();
        let err = catalog.fetch_current().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch products");

        let state = catalog.snapshot();
        assert!(state.products.is_empty());
        assert_eq!(state.status.error.as_deref(), Some("Failed to fetch products"));
    }
}
