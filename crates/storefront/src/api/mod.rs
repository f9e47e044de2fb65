//! Typed HTTP client for the storefront backend.
//!
//! Every backend payload is decoded into the records of `the_wind_core`
//! here; nothing untyped leaves this module. Endpoint groups live in
//! submodules as `impl ApiClient` blocks.

mod account;
mod cart;
mod catalog;
mod checkout;
mod orders;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::StorefrontConfig;
use crate::storage::{SharedStore, StorageError, TokenStorage};

/// Longest response body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors from a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Response body did not match the expected record.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authenticated endpoint called without a stored token.
    #[error("not signed in")]
    MissingToken,

    /// Request rejected before it was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Persisted state could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status of a backend rejection, if that is what this is.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the storefront backend.
///
/// Cheap to clone; all clones share one connection pool and one token
/// store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: TokenStorage,
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, store: SharedStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.backend_url.clone(),
                tokens: TokenStorage::new(store),
            }),
        })
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Token storage shared with the session.
    #[must_use]
    pub fn tokens(&self) -> &TokenStorage {
        &self.inner.tokens
    }

    /// Build an endpoint URL from path segments. Segments are
    /// percent-encoded, so ids can be passed as-is.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start an anonymous request.
    #[must_use]
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.client.request(method, url)
    }

    /// Start a request carrying the stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` when nobody is signed in.
    pub fn authorized(&self, method: Method, url: Url) -> Result<RequestBuilder, ApiError> {
        let token = self.inner.tokens.load()?.ok_or(ApiError::MissingToken)?;
        Ok(self.request(method, url).bearer_auth(token.expose_secret()))
    }

    /// Send a request and decode its JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// body that does not decode into `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to decode backend response"
            );
            ApiError::Decode(e)
        })
    }

    /// Send a request whose response body is not needed.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn send_discarding(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send_raw(request).await.map(|_| ())
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Backend request failed");
            ApiError::Http(e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                path = %url,
                body = %excerpt(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status { status, body });
        }

        debug!(status = %status, path = %url, "Backend request succeeded");
        Ok(body)
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        let config = StorefrontConfig::for_backend(base, ".wind-test").unwrap();
        ApiClient::new(&config, MemoryStore::shared()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:9000");
        let url = api.endpoint(&["api", "products", "similar", "P1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/products/similar/P1");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://shop.example/backend/");
        let url = api.endpoint(&["api", "cart", "merge"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example/backend/api/cart/merge");
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://localhost:9000");
        let url = api.endpoint(&["api", "orders", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/orders/a%2Fb%20c");
    }

    #[test]
    fn test_authorized_without_token() {
        let api = client("http://localhost:9000");
        let url = api.endpoint(&["api", "orders", "my-orders"]).unwrap();
        assert!(matches!(
            api.authorized(Method::GET, url),
            Err(ApiError::MissingToken)
        ));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(2000);
        assert_eq!(excerpt(&long).len(), LOG_BODY_LIMIT);
        assert_eq!(excerpt("short"), "short");
    }
}
