//! Product endpoints.

use reqwest::Method;
use the_wind_core::{Filters, Product, ProductId, ProductUpdate};
use tracing::instrument;
use url::Url;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /api/products` with the non-empty filter fields as query
    /// parameters, plus `limit` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product
    /// list.
    #[instrument(skip(self, filters), fields(query = %filters))]
    pub async fn fetch_products(
        &self,
        filters: &Filters,
        limit: Option<u32>,
    ) -> Result<Vec<Product>, ApiError> {
        let url = self.products_url(filters, limit)?;
        self.send(self.request(Method::GET, url)).await
    }

    /// `GET /api/products/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&["api", "products", id.as_str()])?;
        self.send(self.request(Method::GET, url)).await
    }

    /// `GET /api/products/similar/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product
    /// list.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_similar_products(&self, id: &ProductId) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint(&["api", "products", "similar", id.as_str()])?;
        self.send(self.request(Method::GET, url)).await
    }

    /// `GET /api/products/new-arrivals`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product
    /// list.
    #[instrument(skip(self))]
    pub async fn fetch_new_arrivals(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint(&["api", "products", "new-arrivals"])?;
        self.send(self.request(Method::GET, url)).await
    }

    /// `GET /api/products/best-seller`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product.
    #[instrument(skip(self))]
    pub async fn fetch_best_seller(&self) -> Result<Product, ApiError> {
        let url = self.endpoint(&["api", "products", "best-seller"])?;
        self.send(self.request(Method::GET, url)).await
    }

    /// `PUT /api/products/:id` (admin token required).
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a product.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, ApiError> {
        let url = self.endpoint(&["api", "products", id.as_str()])?;
        self.send(self.authorized(Method::PUT, url)?.json(update)).await
    }

    fn products_url(&self, filters: &Filters, limit: Option<u32>) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["api", "products"])?;
        filters.apply_to_url(&mut url);
        if let Some(limit) = limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use the_wind_core::FilterField;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::storage::MemoryStore;

    fn client() -> ApiClient {
        let config = StorefrontConfig::for_backend("http://localhost:9000", ".wind-test").unwrap();
        ApiClient::new(&config, MemoryStore::shared()).unwrap()
    }

    #[test]
    fn test_products_url_without_filters() {
        let url = client().products_url(&Filters::default(), None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/products");
    }

    #[test]
    fn test_products_url_omits_empty_fields() {
        let mut filters = Filters::default();
        filters.set(FilterField::Gender, "Women");
        filters.set(FilterField::Category, "Sandals");
        filters.set(FilterField::Color, "");

        let url = client().products_url(&filters, Some(8)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/api/products?category=Sandals&gender=Women&limit=8"
        );
    }

    #[test]
    fn test_products_url_joins_list_fields() {
        let mut filters = Filters::default();
        filters.set(FilterField::Size, "9,11");

        let url = client().products_url(&filters, None).unwrap();
        assert_eq!(url.query(), Some("size=9%2C11"));
    }
}
