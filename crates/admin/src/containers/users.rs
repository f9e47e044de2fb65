//! User management.

use std::sync::Arc;

use the_wind_core::{NewUser, User, UserId, UserUpdate};
use the_wind_storefront::containers::StateCell;
use the_wind_storefront::{Operation, OperationError};
use tracing::{info, instrument};

use super::{ListState, remove, splice};
use crate::api::AdminApi;

#[derive(Clone)]
pub struct UsersAdmin {
    inner: Arc<UsersInner>,
}

struct UsersInner {
    api: AdminApi,
    state: StateCell<ListState<User>>,
}

impl UsersAdmin {
    #[must_use]
    pub fn new(api: AdminApi) -> Self {
        Self {
            inner: Arc::new(UsersInner {
                api,
                state: StateCell::new(ListState::default()),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ListState<User> {
        self.inner.state.snapshot()
    }

    /// # Errors
    ///
    /// Returns `Failed to fetch users` and keeps the previous list.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<User>, OperationError> {
        let call = self.inner.api.fetch_users();
        self.inner
            .state
            .track(Operation::FetchUsers, call, |state, users| {
                state.items = users.clone();
                users
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to add user`.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&self, user: &NewUser) -> Result<User, OperationError> {
        let call = self.inner.api.create_user(user);
        let created = self
            .inner
            .state
            .track(Operation::AddUser, call, |state, created| {
                state.items.push(created.clone());
                created
            })
            .await?;
        info!(user_id = %created.id, role = %created.role, "User created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `Failed to update user`.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update(&self, id: &UserId, update: &UserUpdate) -> Result<User, OperationError> {
        let call = self.inner.api.update_user(id, update);
        self.inner
            .state
            .track(Operation::UpdateUser, call, |state, updated| {
                splice(&mut state.items, updated.clone());
                updated
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `Failed to delete user`; the user stays listed.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: &UserId) -> Result<(), OperationError> {
        let call = self.inner.api.delete_user(id);
        self.inner
            .state
            .track(Operation::DeleteUser, call, |state, ()| {
                remove(&mut state.items, id);
            })
            .await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
