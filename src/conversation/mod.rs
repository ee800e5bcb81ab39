//! # Conversation Engine
//!
//! Walks one participant from item selection, through one quantity question per item, to a
//! completed order:
//!
//! ```text
//! (none) ──submit──▶ AwaitingQuantity(first) ──answer/remove──▶ AwaitingQuantity(next)
//!                                  │                                   │
//!                                  └────────── last answered ──────────┴──▶ Complete
//! ```
//!
//! Every handler is a boundary: it gates on the order window, persists each change before
//! anything is sent, and turns every failure into a logged error plus a short
//! [`Notice`](crate::gateway::Notice) to the user. Handlers never return errors; their
//! outcome says what happened.

pub mod error;
pub mod guest;
pub mod quantity;
pub mod selection;

pub use error::*;
pub use guest::GuestOrder;
pub use quantity::QuantityAnswer;
pub use selection::{order_form, resolve, selections_from_form, Selection, ORDER_FORM_CALLBACK};

use crate::clients::WindowClient;
use crate::gateway::{ChannelId, MessageRef, MessagingGateway, OutboundMessage, TriggerId};
use crate::model::{Advance, ConversationState, ItemKey, MenuCatalog, Order, OrderId, QuantityDelta, UserId};
use crate::order_store::OrderStore;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Reply to a selection form submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResponse {
    /// Order stored, first quantity prompt sent.
    Accepted,
    Closed,
    /// Nothing usable was selected; show `message` on `block_id`.
    Rejected { block_id: String, message: String },
    Failed,
}

/// What became of a typed quantity reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Not a direct message, or no question is pending.
    Ignored,
    Closed,
    Invalid,
    /// Asked for the next item.
    Prompted,
    Completed,
    Emptied,
    Failed,
}

/// Outcome of the remaining entry points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Done,
    Closed,
    Failed,
}

trait Outcome {
    fn failed() -> Self;
}

impl Outcome for SubmissionResponse {
    fn failed() -> Self {
        SubmissionResponse::Failed
    }
}

impl Outcome for ReplyOutcome {
    fn failed() -> Self {
        ReplyOutcome::Failed
    }
}

impl Outcome for TurnOutcome {
    fn failed() -> Self {
        TurnOutcome::Failed
    }
}

/// Where notices for a turn go: the user, or the channel holding the message they clicked.
#[derive(Clone, Copy)]
enum Recipient<'a> {
    User(&'a UserId),
    Channel(&'a ChannelId),
}

pub struct ConversationEngine {
    window: WindowClient,
    store: Arc<dyn OrderStore>,
    menu: Arc<dyn MenuCatalog>,
    gateway: Arc<dyn MessagingGateway>,
    tz: Tz,
}

impl ConversationEngine {
    pub fn new(
        window: WindowClient,
        store: Arc<dyn OrderStore>,
        menu: Arc<dyn MenuCatalog>,
        gateway: Arc<dyn MessagingGateway>,
        tz: Tz,
    ) -> Self {
        Self {
            window,
            store,
            menu,
            gateway,
            tz,
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Opens the selection form.
    #[instrument(skip(self, trigger), fields(user = %user))]
    pub async fn open_order_form(&self, user: &UserId, trigger: &TriggerId) -> TurnOutcome {
        let to = Recipient::User(user);
        let result = self.show_form(to, trigger).await;
        self.settle(to, result).await
    }

    /// Replaces the user's items with the selection and asks for the first quantity.
    #[instrument(skip(self, selections), fields(user = %user, selected = selections.len()))]
    pub async fn on_selection_submitted(
        &self,
        user: &UserId,
        user_name: &str,
        selections: &[Selection],
    ) -> SubmissionResponse {
        let to = Recipient::User(user);
        let result = self.submit_selection(to, user, user_name, selections).await;
        self.settle(to, result).await
    }

    /// Handles a typed answer to the pending quantity question.
    #[instrument(skip(self, text), fields(user = %user, channel = %channel))]
    pub async fn on_quantity_reply(&self, user: &UserId, channel: &ChannelId, text: &str) -> ReplyOutcome {
        if !channel.is_direct() {
            return ReplyOutcome::Ignored;
        }
        let to = Recipient::User(user);
        let result = self.answer_quantity(to, user, text).await;
        self.settle(to, result).await
    }

    /// Steps one item of a completed order up or down and re-renders `message`.
    #[instrument(skip(self, message), fields(order = %order_id, item = %item))]
    pub async fn on_quantity_button(
        &self,
        order_id: &OrderId,
        item: &ItemKey,
        delta: QuantityDelta,
        message: &MessageRef,
    ) -> TurnOutcome {
        let to = Recipient::Channel(&message.channel);
        let result = self.adjust(to, order_id, item, delta, message).await;
        self.settle(to, result).await
    }

    /// Posts the confirmation and removes the editable card. The stored order stays.
    #[instrument(skip(self, message), fields(order = %order_id))]
    pub async fn on_confirm(&self, order_id: &OrderId, message: &MessageRef) -> TurnOutcome {
        let to = Recipient::Channel(&message.channel);
        let result = self.confirm(to, order_id, message).await;
        self.settle(to, result).await
    }

    // =========================================================================
    // Turns
    // =========================================================================

    async fn show_form(&self, to: Recipient<'_>, trigger: &TriggerId) -> Result<TurnOutcome, ConversationError> {
        if !self.gate(to).await? {
            return Ok(TurnOutcome::Closed);
        }
        self.gateway
            .open_form(trigger, order_form(self.menu.as_ref()))
            .await?;
        debug!("Order form opened");
        Ok(TurnOutcome::Done)
    }

    async fn submit_selection(
        &self,
        to: Recipient<'_>,
        user: &UserId,
        user_name: &str,
        selections: &[Selection],
    ) -> Result<SubmissionResponse, ConversationError> {
        if !self.gate(to).await? {
            return Ok(SubmissionResponse::Closed);
        }

        let items = resolve(self.menu.as_ref(), selections);
        if items.is_empty() {
            debug!("Nothing usable selected");
            return Ok(SubmissionResponse::Rejected {
                block_id: selection::first_block_id(self.menu.as_ref()),
                message: "Select at least one item".to_string(),
            });
        }

        let mut order = self
            .store
            .find_for_user(user)
            .await?
            .unwrap_or_else(|| Order::new(user.clone(), user_name));
        order.user_name = user_name.to_string();
        let first = order
            .replace_items(items)
            .cloned()
            .ok_or_else(|| ConversationError::Validation("selection has no pending item".to_string()))?;

        let saved = self.store.save(order).await?;
        info!(items = saved.items.len(), order = ?saved.order_id, "Selection stored");

        self.gateway
            .send_direct(user, OutboundMessage::QuantityPrompt { item_name: first.name })
            .await?;
        Ok(SubmissionResponse::Accepted)
    }

    async fn answer_quantity(
        &self,
        to: Recipient<'_>,
        user: &UserId,
        text: &str,
    ) -> Result<ReplyOutcome, ConversationError> {
        // Without a pending question this is ordinary chatter, not an ordering attempt.
        let Some(mut order) = self.store.find_for_user(user).await? else {
            return Ok(ReplyOutcome::Ignored);
        };
        if !matches!(order.state()?, ConversationState::AwaitingQuantity(_)) {
            return Ok(ReplyOutcome::Ignored);
        }

        if !self.gate(to).await? {
            return Ok(ReplyOutcome::Closed);
        }

        let Some(answer) = QuantityAnswer::parse(text) else {
            debug!(text, "Invalid quantity");
            self.gateway.send_direct(user, OutboundMessage::InvalidQuantity).await?;
            return Ok(ReplyOutcome::Invalid);
        };

        match answer {
            QuantityAnswer::Set(quantity) => {
                order.answer_current(quantity)?;
                debug!(quantity, "Quantity set");
            }
            QuantityAnswer::Remove => {
                let removed = order.remove_current()?;
                debug!(item = %removed.key(), "Item removed");
            }
        }
        let next = order.advance();
        let saved = self.store.save(order).await?;

        let (message, outcome) = match next {
            Advance::Prompt(item) => (
                OutboundMessage::QuantityPrompt { item_name: item.name },
                ReplyOutcome::Prompted,
            ),
            Advance::Complete => {
                info!(order = ?saved.order_id, items = saved.items.len(), "Order complete");
                (summary(&saved), ReplyOutcome::Completed)
            }
            Advance::Emptied => {
                info!("Order emptied");
                (OutboundMessage::OrderEmptied, ReplyOutcome::Emptied)
            }
        };
        self.gateway.send_direct(user, message).await?;
        Ok(outcome)
    }

    async fn adjust(
        &self,
        to: Recipient<'_>,
        order_id: &OrderId,
        item: &ItemKey,
        delta: QuantityDelta,
        message: &MessageRef,
    ) -> Result<TurnOutcome, ConversationError> {
        if !self.gate(to).await? {
            return Ok(TurnOutcome::Closed);
        }
        let mut order = self.order_by_id(order_id).await?;
        let quantity = order.adjust_quantity(item, delta)?;
        let saved = self.store.save(order).await?;
        info!(quantity, "Quantity adjusted");
        self.gateway.update_message(message, summary(&saved)).await?;
        Ok(TurnOutcome::Done)
    }

    async fn confirm(
        &self,
        to: Recipient<'_>,
        order_id: &OrderId,
        message: &MessageRef,
    ) -> Result<TurnOutcome, ConversationError> {
        if !self.gate(to).await? {
            return Ok(TurnOutcome::Closed);
        }
        let order = self.order_by_id(order_id).await?;
        self.gateway
            .send_to_channel(
                &message.channel,
                OutboundMessage::OrderConfirmed {
                    user_name: order.user_name,
                    items: order.items,
                },
            )
            .await?;
        self.gateway.delete_message(message).await?;
        info!("Order confirmed");
        Ok(TurnOutcome::Done)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Whether ordering is open; tells the recipient when it opens again if not.
    async fn gate(&self, to: Recipient<'_>) -> Result<bool, ConversationError> {
        let status = self.window.status().await?;
        if status.is_open() {
            return Ok(true);
        }
        debug!(next_opening = ?status.next_opening, "Ordering closed");
        let next_opening = status.next_opening.map(|at| at.with_timezone(&self.tz));
        self.tell(to, OutboundMessage::OrderingClosed { next_opening }).await?;
        Ok(false)
    }

    async fn order_by_id(&self, order_id: &OrderId) -> Result<Order, ConversationError> {
        self.store
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| ConversationError::OrderNotFound(order_id.to_string()))
    }

    async fn tell(&self, to: Recipient<'_>, message: OutboundMessage) -> Result<(), ConversationError> {
        match to {
            Recipient::User(user) => self.gateway.send_direct(user, message).await?,
            Recipient::Channel(channel) => self.gateway.send_to_channel(channel, message).await?,
        };
        Ok(())
    }

    /// Ends a turn: failures are logged and answered with a notice.
    async fn settle<O: Outcome>(&self, to: Recipient<'_>, result: Result<O, ConversationError>) -> O {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Conversation turn failed");
                if let Err(notice_error) = self.tell(to, OutboundMessage::Notice(e.notice())).await {
                    warn!(error = %notice_error, "Could not deliver notice");
                }
                O::failed()
            }
        }
    }
}

fn summary(order: &Order) -> OutboundMessage {
    OutboundMessage::OrderSummary {
        order_id: order.order_id,
        items: order.items.clone(),
    }
}
