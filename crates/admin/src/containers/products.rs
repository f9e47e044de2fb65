//! Product management.

use std::path::Path;
use std::sync::Arc;

use the_wind_core::{NewProduct, Product, ProductId, ProductUpdate};
use the_wind_storefront::containers::StateCell;
use the_wind_storefront::{Operation, OperationError};
use tracing::{info, instrument};

use super::{ListState, remove, splice};
use crate::api::AdminApi;

#[derive(Clone)]
pub struct ProductsAdmin {
    inner: Arc<ProductsInner>,
}

struct ProductsInner {
    api: AdminApi,
    state: StateCell<ListState<Product>>,
}

impl ProductsAdmin {
    #[must_use]
    pub fn new(api: AdminApi) -> Self {
        Self {
            inner: Arc::new(ProductsInner {
                api,
                state: StateCell::new(ListState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ListState<Product> {
        self.inner.state.snapshot()
    }

    /// Listed product with `id`, if fetched.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.inner
            .state
            .read(|state| state.items.iter().find(|p| &p.id == id).cloned())
    }

    /// # Errors
    ///
    /// Returns `Failed to fetch products` and keeps the previous list.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<Product>, OperationError> {
        let call = self.inner.api.fetch_products();
        self.inner
            .state
            .track(Operation::FetchAdminProducts, call, |state, products| {
                state.items = products.clone();
                products
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to create product`.
    #[instrument(skip(self, product), fields(sku = %product.sku))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, OperationError> {
        let call = self.inner.api.create_product(product);
        let created = self
            .inner
            .state
            .track(Operation::CreateProduct, call, |state, created| {
                state.items.push(created.clone());
                created
            })
            .await?;
        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `Failed to update product`.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, OperationError> {
        let call = self.inner.api.update_product(id, update);
        self.inner
            .state
            .track(Operation::UpdateProduct, call, |state, updated| {
                splice(&mut state.items, updated.clone());
                updated
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to delete product`; the product stays listed.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), OperationError> {
        let call = self.inner.api.delete_product(id);
        self.inner
            .state
            .track(Operation::DeleteProduct, call, |state, ()| {
                remove(&mut state.items, id);
            })
            .await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Upload the image at `path` and append it to `update`'s images with
    /// empty alt text. Nothing is saved until `update` is sent.
    ///
    /// # Errors
    ///
    /// Returns `Failed to upload image`; `update` is left as it was.
    #[instrument(skip(self, update))]
    pub async fn attach_image(
        &self,
        update: &mut ProductUpdate,
        path: &Path,
    ) -> Result<String, OperationError> {
        let call = self.inner.api.upload_image_file(path);
        let url = self
            .inner
            .state
            .track(Operation::UploadImage, call, |_, url| url)
            .await?;
        update.push_image(url.clone());
        Ok(url)
    }
}
