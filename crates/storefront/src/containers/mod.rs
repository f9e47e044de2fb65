//! State containers.
//!
//! Each container owns one slice of client state behind a lock and
//! changes it only through its async operations. An operation moves
//! through three observable states:
//!
//! - pending: `loading = true`, previous error cleared
//! - fulfilled: `loading = false`, the response replaces the slice
//! - rejected: `loading = false`, the generic error message is set and
//!   the slice is left as it was
//!
//! Concurrent operations are not sequenced: whichever response resolves
//! last wins.

mod cart;
mod catalog;
mod checkout;
mod orders;
mod session;

use std::future::Future;
use std::sync::{PoisonError, RwLock};

use crate::api::ApiError;
use crate::error::{Operation, OperationError};

pub use cart::{CartContainer, CartState};
pub use catalog::{CatalogContainer, CatalogState, collection_filters};
pub use checkout::{CheckoutFlow, CheckoutState};
pub use orders::{OrdersContainer, OrdersState};
pub use session::{Destination, SessionContainer, SessionState, post_login_destination};

/// Loading and error flags shared by every container state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Container state carrying a [`RequestStatus`].
pub trait Tracked {
    fn status_mut(&mut self) -> &mut RequestStatus;
}

/// Lock around a container state.
///
/// Readers get clones; writers run a closure under the write lock. A
/// poisoned lock is recovered, since every update leaves the state whole.
#[derive(Debug, Default)]
pub struct StateCell<S> {
    state: RwLock<S>,
}

impl<S: Clone> StateCell<S> {
    pub const fn new(state: S) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> S {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read part of the state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Mutate the state.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<S: Clone + Tracked> StateCell<S> {
    /// Run one backend call through the pending/fulfilled/rejected cycle.
    ///
    /// `apply` folds the response into the state under the write lock and
    /// its return value becomes the operation's result.
    ///
    /// # Errors
    ///
    /// Returns the call's error tagged with `operation`; the state only
    /// records the generic message.
    pub async fn track<T, R>(
        &self,
        operation: Operation,
        call: impl Future<Output = Result<T, ApiError>>,
        apply: impl FnOnce(&mut S, T) -> R,
    ) -> Result<R, OperationError> {
        self.update(|state| {
            let status = state.status_mut();
            status.loading = true;
            status.error = None;
        });

        let outcome = call.await;

        self.update(|state| {
            state.status_mut().loading = false;
            match outcome {
                Ok(value) => Ok(apply(state, value)),
                Err(source) => {
                    let err = OperationError::new(operation, source);
                    state.status_mut().error = Some(err.to_string());
                    Err(err)
                }
            }
        })
    }

    /// Record a failure that never reached the backend.
    pub fn reject(&self, operation: Operation, source: ApiError) -> OperationError {
        let err = OperationError::new(operation, source);
        self.update(|state| {
            let status = state.status_mut();
            status.loading = false;
            status.error = Some(err.to_string());
        });
        err
    }
}
