//! Admin console entry point.
//!
//! The console is only built for a signed-in admin. That check only
//! hides the console; the backend still authorizes every call.

use the_wind_storefront::ApiClient;
use the_wind_storefront::containers::SessionContainer;
use tracing::{debug, instrument};

use crate::api::AdminApi;
use crate::containers::{OrdersAdmin, ProductsAdmin, UsersAdmin};
use crate::error::AdminError;

/// The three admin lists over one [`AdminApi`].
#[derive(Clone)]
pub struct AdminConsole {
    api: AdminApi,
    users: UsersAdmin,
    products: ProductsAdmin,
    orders: OrdersAdmin,
}

impl AdminConsole {
    /// Console for the session's user, or `None` unless that user is an
    /// admin.
    #[must_use]
    pub fn open(session: &SessionContainer, api: ApiClient) -> Option<Self> {
        Self::require(session, api).ok()
    }

    /// As [`Self::open`], saying why the console was refused.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when nobody is signed in and `Forbidden` for
    /// a non-admin account.
    #[instrument(skip(session, api))]
    pub fn require(session: &SessionContainer, api: ApiClient) -> Result<Self, AdminError> {
        let user = session.user().ok_or(AdminError::Unauthorized)?;
        if !user.is_admin() {
            return Err(AdminError::Forbidden {
                email: user.email.to_string(),
            });
        }

        debug!(user_id = %user.id, "Opening admin console");
        let api = AdminApi::new(api);
        Ok(Self {
            users: UsersAdmin::new(api.clone()),
            products: ProductsAdmin::new(api.clone()),
            orders: OrdersAdmin::new(api.clone()),
            api,
        })
    }

    #[must_use]
    pub const fn api(&self) -> &AdminApi {
        &self.api
    }

    #[must_use]
    pub const fn users(&self) -> &UsersAdmin {
        &self.users
    }

    #[must_use]
    pub const fn products(&self) -> &ProductsAdmin {
        &self.products
    }

    #[must_use]
    pub const fn orders(&self) -> &OrdersAdmin {
        &self.orders
    }
}
