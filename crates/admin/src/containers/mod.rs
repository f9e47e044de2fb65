//! Admin list containers.
//!
//! Users, products and orders share one shape: fetching replaces the
//! list, creating appends the record the backend returned, updating
//! splices it in by id, deleting filters the id out. Each operation runs
//! through the storefront's pending/fulfilled/rejected cycle, so a failed
//! call leaves the list untouched and sets the generic message.

mod orders;
mod products;
mod users;

use the_wind_core::{AdminOrder, OrderId, Product, ProductId, User, UserId};
use the_wind_storefront::containers::{RequestStatus, Tracked};

pub use orders::{AdminOrdersState, OrdersAdmin};
pub use products::ProductsAdmin;
pub use users::UsersAdmin;

/// Record carrying a backend id.
pub trait Keyed {
    type Key: PartialEq;

    fn key(&self) -> &Self::Key;
}

impl Keyed for User {
    type Key = UserId;

    fn key(&self) -> &UserId {
        &self.id
    }
}

impl Keyed for Product {
    type Key = ProductId;

    fn key(&self) -> &ProductId {
        &self.id
    }
}

impl Keyed for AdminOrder {
    type Key = OrderId;

    fn key(&self) -> &OrderId {
        &self.id
    }
}

/// Replace the record with the same id. Records not in the list are
/// dropped, matching a list that was never fetched.
pub fn splice<T: Keyed>(items: &mut [T], record: T) -> bool {
    match items.iter_mut().find(|item| item.key() == record.key()) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

/// Drop every record with id `key`.
pub fn remove<T: Keyed>(items: &mut Vec<T>, key: &T::Key) {
    items.retain(|item| item.key() != key);
}

/// Snapshot of one admin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub status: RequestStatus,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: RequestStatus::default(),
        }
    }
}

impl<T> Tracked for ListState<T> {
    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}
