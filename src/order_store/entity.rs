//! [`ActorEntity`] implementation that lets the store actor keep [`Order`]s.
//!
//! Orders are keyed by user, so a user holds at most one order per cycle. The save hook
//! hands out the order id and refuses orders that break the item invariants.

use crate::framework::ActorEntity;
use crate::model::{Order, OrderId, UserId};
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for Order {
    type Id = UserId;
    type Context = ();

    fn id(&self) -> UserId {
        self.user_id.clone()
    }

    async fn on_save(&mut self, previous: Option<&Self>, _ctx: &()) -> Result<(), String> {
        if self.order_id.is_none() {
            self.order_id = Some(
                previous
                    .and_then(|p| p.order_id)
                    .unwrap_or_else(OrderId::generate),
            );
        }
        self.validate().map_err(|e| e.to_string())
    }
}
