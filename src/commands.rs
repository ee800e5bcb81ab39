//! Read-only status queries: the running total and the "ping" summary.

use crate::aggregator::{build_ping_summary, build_report};
use crate::gateway::{ChannelId, MessagingGateway, Notice, OutboundMessage};
use crate::model::MenuCatalog;
use crate::order_store::OrderStore;
use std::sync::Arc;
use tracing::{debug, error, instrument};

pub struct StatusCommands {
    store: Arc<dyn OrderStore>,
    menu: Arc<dyn MenuCatalog>,
    gateway: Arc<dyn MessagingGateway>,
}

impl StatusCommands {
    pub fn new(
        store: Arc<dyn OrderStore>,
        menu: Arc<dyn MenuCatalog>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self { store, menu, gateway }
    }

    /// The consolidated order so far, returned to the caller only.
    #[instrument(skip(self), fields(channel = %channel))]
    pub async fn total_order(&self, channel: &ChannelId) -> OutboundMessage {
        if !channel.is_direct() {
            return OutboundMessage::Notice(Notice::DirectMessageOnly);
        }
        let orders = match self.store.load_all().await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "Could not load orders");
                return OutboundMessage::Notice(Notice::TryLater);
            }
        };
        let report = build_report(&orders);
        if report.is_empty() {
            return OutboundMessage::Notice(Notice::NoOrdersYet);
        }
        debug!(total = report.total_items(), "Total order requested");
        OutboundMessage::Report(report.labelled(self.menu.as_ref()))
    }

    /// Posts the item totals to `channel` when `text` asks for them; returns whether it did.
    #[instrument(skip(self, text), fields(channel = %channel))]
    pub async fn ping(&self, channel: &ChannelId, text: &str) -> bool {
        if !text.to_lowercase().contains("ping") {
            return false;
        }
        let orders = match self.store.load_all().await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "Could not load orders");
                return false;
            }
        };
        let summary = OutboundMessage::PingSummary(build_ping_summary(&orders));
        match self.gateway.send_to_channel(channel, summary).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Could not post ping summary");
                false
            }
        }
    }
}
