//! Orders managed from outside the chat conversation, e.g. entered on behalf of a guest.
//!
//! Guest lines arrive with their quantity, so no question is asked. These operations are
//! not gated on the order window and report failures to the caller instead of the user.

use super::{ConversationEngine, ConversationError};
use crate::model::{Order, OrderItem, UserId};
use tracing::{debug, info, instrument};

/// Result of [`ConversationEngine::place_guest_order`].
#[derive(Clone, Debug, PartialEq)]
pub enum GuestOrder {
    Created(Order),
    /// The user already had an order; its id was kept.
    Updated(Order),
}

impl GuestOrder {
    pub fn order(&self) -> &Order {
        match self {
            GuestOrder::Created(order) | GuestOrder::Updated(order) => order,
        }
    }
}

impl ConversationEngine {
    /// Replaces the user's items with already quantified lines.
    #[instrument(skip(self, items), fields(user = %user, items = items.len()))]
    pub async fn place_guest_order(
        &self,
        user: &UserId,
        user_name: &str,
        items: Vec<OrderItem>,
    ) -> Result<GuestOrder, ConversationError> {
        let existing = self.store.find_for_user(user).await?;
        let created = existing.is_none();
        let mut order = existing.unwrap_or_else(|| Order::new(user.clone(), user_name));
        order.user_name = user_name.to_string();
        order.replace_items(items.into_iter().map(|item| self.answered(item)).collect());
        order.validate()?;

        let saved = self.store.save(order).await?;
        info!(order = ?saved.order_id, created, "Guest order stored");
        Ok(if created {
            GuestOrder::Created(saved)
        } else {
            GuestOrder::Updated(saved)
        })
    }

    pub async fn order_for(&self, user: &UserId) -> Result<Option<Order>, ConversationError> {
        Ok(self.store.find_for_user(user).await?)
    }

    /// Deletes the user's order; returns it if there was one.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn withdraw_order(&self, user: &UserId) -> Result<Option<Order>, ConversationError> {
        let removed = self.store.remove_for_user(user).await?;
        match &removed {
            Some(order) => info!(order = ?order.order_id, "Order withdrawn"),
            None => debug!("No order to withdraw"),
        }
        Ok(removed)
    }

    /// The line as stored: answered, with the menu's spelling of a known category.
    fn answered(&self, item: OrderItem) -> OrderItem {
        let category = self
            .menu
            .category(&item.category)
            .map(|category| category.key.clone())
            .unwrap_or_else(|| item.category.clone());
        OrderItem {
            category,
            needs_quantity: false,
            ..item
        }
    }
}
