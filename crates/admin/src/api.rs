//! Admin endpoints.
//!
//! Everything under `/api/admin` needs an admin bearer token; the backend
//! is the one enforcing the role. Image upload is the exception and goes
//! out anonymously.

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use the_wind_core::{
    AdminOrder, NewProduct, NewUser, OrderId, OrderStatus, Product, ProductId, ProductUpdate,
    User, UserId, UserUpdate,
};
use the_wind_storefront::{ApiClient, ApiError};
use the_wind_storefront::storage::StorageError;
use tracing::{debug, instrument};

/// User create/update responses wrap the record.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    image_url: String,
}

/// Typed client for the admin endpoints, sharing the storefront's
/// connection pool and token store.
#[derive(Clone)]
pub struct AdminApi {
    api: ApiClient,
}

impl AdminApi {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// `GET /api/admin/users`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a user list.
    #[instrument(skip(self))]
    pub async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "users"])?;
        self.api.send(self.api.authorized(Method::GET, url)?).await
    }

    /// `POST /api/admin/users`, answering `{ user }`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a wrapped user.
    #[instrument(skip(self, user), fields(email = %user.email, role = ?user.role))]
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "users"])?;
        let envelope: UserEnvelope = self
            .api
            .send(self.api.authorized(Method::POST, url)?.json(user))
            .await?;
        Ok(envelope.user)
    }

    /// `PUT /api/admin/users/:id` with `{ name, email, role }`, answering
    /// `{ user }`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a wrapped user.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, update: &UserUpdate) -> Result<User, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "users", id.as_str()])?;
        let envelope: UserEnvelope = self
            .api
            .send(self.api.authorized(Method::PUT, url)?.json(update))
            .await?;
        Ok(envelope.user)
    }

    /// `DELETE /api/admin/users/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        let url = self.api.endpoint(&["api", "admin", "users", id.as_str()])?;
        self.api
            .send_discarding(self.api.authorized(Method::DELETE, url)?)
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// `GET /api/admin/products`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a product list.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "products"])?;
        self.api.send(self.api.authorized(Method::GET, url)?).await
    }

    /// `POST /api/admin/products`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a product.
    #[instrument(skip(self, product), fields(sku = %product.sku))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "products"])?;
        self.api
            .send(self.api.authorized(Method::POST, url)?.json(product))
            .await
    }

    /// `PUT /api/admin/products/:id`.
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
        let url = self.api.endpoint(&["api", "admin", "products", id.as_str()])?;
        self.api
            .send(self.api.authorized(Method::PUT, url)?.json(update))
            .await
    }

    /// `DELETE /api/admin/products/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let url = self.api.endpoint(&["api", "admin", "products", id.as_str()])?;
        self.api
            .send_discarding(self.api.authorized(Method::DELETE, url)?)
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// `GET /api/admin/orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not an order list.
    #[instrument(skip(self))]
    pub async fn fetch_orders(&self) -> Result<Vec<AdminOrder>, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "orders"])?;
        self.api.send(self.api.authorized(Method::GET, url)?).await
    }

    /// `PUT /api/admin/orders/:id` with `{ status }`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not an order.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<AdminOrder, ApiError> {
        let url = self.api.endpoint(&["api", "admin", "orders", id.as_str()])?;
        self.api
            .send(
                self.api
                    .authorized(Method::PUT, url)?
                    .json(&StatusUpdate { status }),
            )
            .await
    }

    /// `DELETE /api/admin/orders/:id`.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored or the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: &OrderId) -> Result<(), ApiError> {
        let url = self.api.endpoint(&["api", "admin", "orders", id.as_str()])?;
        self.api
            .send_discarding(self.api.authorized(Method::DELETE, url)?)
            .await
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// `POST /api/upload` with the bytes as multipart field `image`.
    /// Returns the hosted image URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body has no
    /// `imageUrl`.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(image_mime(file_name))?;
        let form = Form::new().part("image", part);

        let url = self.api.endpoint(&["api", "upload"])?;
        let response: UploadResponse = self
            .api
            .send(self.api.request(Method::POST, url).multipart(form))
            .await?;
        debug!(image_url = %response.image_url, "Image uploaded");
        Ok(response.image_url)
    }

    /// Read `path` and upload it as [`Self::upload_image`] does.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the file cannot be read, otherwise
    /// as [`Self::upload_image`].
    pub async fn upload_image_file(&self, path: &Path) -> Result<String, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Storage(StorageError::Io(e)))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image");
        self.upload_image(file_name, bytes).await
    }
}

/// Content type from the file extension.
fn image_mime(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
