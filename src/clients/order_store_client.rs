use crate::clients::actor_client::ActorClient;
use crate::framework::ResourceClient;
use crate::model::{Order, UserId};
use crate::order_store::{OrderStore, StoreError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the order store actor.
#[derive(Clone)]
pub struct OrderStoreClient {
    inner: ResourceClient<Order>,
}

impl OrderStoreClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }
}

impl ActorClient<Order> for OrderStoreClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }
}

#[async_trait]
impl OrderStore for OrderStoreClient {
    async fn load_all(&self) -> Result<Vec<Order>, StoreError> {
        self.list().await
    }

    #[instrument(skip(self, order), fields(user = %order.user_id))]
    async fn save(&self, order: Order) -> Result<Order, StoreError> {
        debug!(?order, "save called");
        Ok(self.inner.save(order).await?)
    }

    #[instrument(skip(self), fields(user = %user))]
    async fn remove_for_user(&self, user: &UserId) -> Result<Option<Order>, StoreError> {
        debug!("remove called");
        Ok(self.inner.remove(user.clone()).await?)
    }

    #[instrument(skip(self))]
    async fn clear_all(&self) -> Result<usize, StoreError> {
        debug!("Sending request");
        Ok(self.inner.clear().await?)
    }

    async fn find_for_user(&self, user: &UserId) -> Result<Option<Order>, StoreError> {
        self.get(user.clone()).await
    }
}
