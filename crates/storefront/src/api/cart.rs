//! Cart endpoints.
//!
//! Every call answers with the whole cart as the backend now sees it.

use std::num::NonZeroU32;

use reqwest::Method;
use serde::Serialize;
use the_wind_core::{Cart, CartIdentity, GuestId, LineKey, ProductId, UserId};
use tracing::instrument;

use super::{ApiClient, ApiError};

/// Body shared by add, update and remove.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartLineRequest<'a> {
    product_id: &'a ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(flatten)]
    identity: &'a CartIdentity,
}

impl<'a> CartLineRequest<'a> {
    fn new(key: &'a LineKey, quantity: Option<NonZeroU32>, identity: &'a CartIdentity) -> Self {
        Self {
            product_id: &key.product_id,
            quantity: quantity.map(NonZeroU32::get),
            size: key.size.as_deref(),
            color: key.color.as_deref(),
            identity,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeRequest<'a> {
    guest_id: &'a GuestId,
    user_id: &'a UserId,
}

impl ApiClient {
    /// `GET /api/cart` for the given owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self, identity), fields(user_id = ?identity.user_id, guest_id = ?identity.guest_id))]
    pub async fn fetch_cart(&self, identity: &CartIdentity) -> Result<Cart, ApiError> {
        let mut url = self.endpoint(&["api", "cart"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(user_id) = &identity.user_id {
                query.append_pair("userId", user_id.as_str());
            }
            if let Some(guest_id) = &identity.guest_id {
                query.append_pair("guestId", guest_id.as_str());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        self.send(self.request(Method::GET, url)).await
    }

    /// `POST /api/cart`: add `quantity` of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self, identity), fields(product_id = %key.product_id))]
    pub async fn add_to_cart(
        &self,
        key: &LineKey,
        quantity: NonZeroU32,
        identity: &CartIdentity,
    ) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["api", "cart"])?;
        let body = CartLineRequest::new(key, Some(quantity), identity);
        self.send(self.request(Method::POST, url).json(&body)).await
    }

    /// `PUT /api/cart`: set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self, identity), fields(product_id = %key.product_id))]
    pub async fn update_cart_quantity(
        &self,
        key: &LineKey,
        quantity: NonZeroU32,
        identity: &CartIdentity,
    ) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["api", "cart"])?;
        let body = CartLineRequest::new(key, Some(quantity), identity);
        self.send(self.request(Method::PUT, url).json(&body)).await
    }

    /// `DELETE /api/cart`: drop a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip(self, identity), fields(product_id = %key.product_id))]
    pub async fn remove_from_cart(
        &self,
        key: &LineKey,
        identity: &CartIdentity,
    ) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["api", "cart"])?;
        let body = CartLineRequest::new(key, None, identity);
        self.send(self.request(Method::DELETE, url).json(&body)).await
    }

    /// `POST /api/cart/merge`: fold the guest cart into the user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored, the request fails, or the
    /// body is not a cart.
    #[instrument(skip(self), fields(guest_id = %guest_id, user_id = %user_id))]
    pub async fn merge_cart(&self, guest_id: &GuestId, user_id: &UserId) -> Result<Cart, ApiError> {
        let url = self.endpoint(&["api", "cart", "merge"])?;
        let body = MergeRequest { guest_id, user_id };
        self.send(self.authorized(Method::POST, url)?.json(&body)).await
    }
}
