//! Integration tests for The Wind.
//!
//! The storefront and admin clients run against [`MockBackend`], an axum
//! server on a random local port that speaks the backend's JSON API over
//! in-memory state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p the-wind-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart` - cart mirror, persistence and rejected calls
//! - `session` - sign-in, registration and the guest cart merge
//! - `catalog` - filters, URL sync and product pages
//! - `checkout` - the create → pay → finalize flow and order history
//! - `admin` - the admin console guard and its CRUD containers

pub mod backend;
pub mod routes;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use the_wind_admin::AdminConsole;
use the_wind_storefront::storage::{MemoryStore, SharedStore};
use the_wind_storefront::{Storefront, StorefrontConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub use backend::{
    ADMIN_EMAIL, ADMIN_PASSWORD, BackendState, SHOPPER_EMAIL, SHOPPER_PASSWORD,
};

/// Client id handed to the payment button in tests.
pub const TEST_PAYPAL_CLIENT_ID: &str = "sb-test";

/// Mock backend bound to `127.0.0.1` on a random port.
///
/// The server task is aborted when the handle drops.
pub struct MockBackend {
    addr: SocketAddr,
    state: routes::Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend over the seeded catalog and accounts.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        Self::spawn_with(BackendState::seeded()).await
    }

    /// Start a backend over `state`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn_with(state: BackendState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = routes::router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind mock backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock backend address: {e}"));

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock backend stopped");
            }
        });
        tracing::debug!(%addr, "Mock backend listening");

        Self {
            addr,
            state,
            server,
        }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Storefront configuration pointing at this backend, with a payment
    /// client id set.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let url = self.url();
        StorefrontConfig::from_lookup(|key| match key {
            "WIND_BACKEND_URL" => Some(url.clone()),
            "WIND_HTTP_TIMEOUT_SECS" => Some("5".to_string()),
            "PAYPAL_CLIENT_ID" => Some(TEST_PAYPAL_CLIENT_ID.to_string()),
            _ => None,
        })
        .unwrap_or_else(|e| panic!("mock backend config: {e}"))
    }

    /// A storefront over a fresh in-memory store.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        self.storefront_with(MemoryStore::shared())
    }

    /// A storefront over `store`, as a restarted client would see it.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn storefront_with(&self, store: SharedStore) -> Storefront {
        Storefront::new(self.config(), store)
            .unwrap_or_else(|e| panic!("build storefront: {e}"))
    }

    /// A storefront signed in as `email`.
    ///
    /// # Panics
    ///
    /// Panics if sign-in fails.
    pub async fn signed_in(&self, email: &str, password: &str) -> Storefront {
        let storefront = self.storefront();
        storefront
            .sign_in(email, &SecretString::from(password.to_string()), None)
            .await
            .unwrap_or_else(|e| panic!("sign in as {email}: {e}"));
        storefront
    }

    /// The admin console of a storefront signed in as the seeded admin.
    ///
    /// # Panics
    ///
    /// Panics if sign-in fails or the console refuses the admin.
    pub async fn admin_console(&self) -> (Storefront, AdminConsole) {
        let storefront = self.signed_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let console = AdminConsole::require(storefront.session(), storefront.api().clone())
            .unwrap_or_else(|e| panic!("open admin console: {e}"));
        (storefront, console)
    }

    /// Every request received so far, as `METHOD /path`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.inspect(|state| state.requests.clone())
    }

    /// Number of requests whose `METHOD /path` starts with `prefix`.
    #[must_use]
    pub fn request_count(&self, prefix: &str) -> usize {
        self.inspect(|state| {
            state
                .requests
                .iter()
                .filter(|request| request.starts_with(prefix))
                .count()
        })
    }

    /// Answer 500 on every path starting with `path_prefix`.
    pub fn fail(&self, path_prefix: &str) {
        self.with_state(|state| state.failing.push(path_prefix.to_string()));
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.with_state(|state| state.failing.clear());
    }

    /// Read the backend state.
    pub fn inspect<R>(&self, f: impl FnOnce(&BackendState) -> R) -> R {
        f(&routes::lock(&self.state))
    }

    /// Change the backend state directly.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut routes::lock(&self.state))
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}
