//! Order Store: the durable user → order mapping of the running cycle.
//!
//! The conversation engine and the scheduled jobs only see the [`OrderStore`] trait. The
//! in-process implementation is a [`ResourceActor`] over [`Order`], reached through
//! [`OrderStoreClient`](crate::clients::OrderStoreClient).

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderStoreClient;
use crate::framework::ResourceActor;
use crate::model::{Order, OrderId, UserId};
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Upserts the order of `order.user_id`; returns it as stored, order id filled in.
    async fn save(&self, order: Order) -> Result<Order, StoreError>;

    /// Deletes the order of `user`; returns it if there was one.
    async fn remove_for_user(&self, user: &UserId) -> Result<Option<Order>, StoreError>;

    /// Deletes every order; returns how many were removed.
    async fn clear_all(&self) -> Result<usize, StoreError>;

    async fn find_for_user(&self, user: &UserId) -> Result<Option<Order>, StoreError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|order| &order.user_id == user))
    }

    async fn find_by_order_id(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|order| order.order_id.as_ref() == Some(id)))
    }
}

/// Creates a new order store actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderStoreClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderStoreClient::new(generic_client))
}
