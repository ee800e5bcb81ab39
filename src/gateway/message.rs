//! What the core says, independent of how the platform renders it.
//!
//! Every message has a plain-text [`Display`](std::fmt::Display) form. Gateways that can do
//! better (buttons on an [`OutboundMessage::OrderSummary`], for instance) match on the
//! variant instead.

use crate::aggregator::{ItemTotal, OrderReport};
use crate::model::{OrderId, OrderItem, MAX_QUANTITY, MIN_QUANTITY};
use chrono::DateTime;
use chrono_tz::Tz;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum OutboundMessage {
    /// Weekly invitation to order.
    Invitation { closes_at: DateTime<Tz> },
    /// Ordering is not possible right now.
    OrderingClosed { next_opening: Option<DateTime<Tz>> },
    QuantityPrompt { item_name: String },
    InvalidQuantity,
    OrderEmptied,
    /// The completed order, with controls to adjust and confirm it.
    OrderSummary {
        order_id: Option<OrderId>,
        items: Vec<OrderItem>,
    },
    OrderConfirmed {
        user_name: String,
        items: Vec<OrderItem>,
    },
    /// The consolidated order of the cycle.
    Report(OrderReport),
    /// Item name → total, for the "ping" query.
    PingSummary(Vec<ItemTotal>),
    Notice(Notice),
}

/// Short user-facing explanations of why nothing happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Something the conversation relied on is gone.
    StartOver,
    TryLater,
    OrderNotFound,
    DirectMessageOnly,
    NoOrdersYet,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Notice::StartOver => {
                "Sorry, something went wrong with your order. Please open the order form and start over."
            }
            Notice::TryLater => "Sorry, your order could not be processed right now. Please try again later.",
            Notice::OrderNotFound => "Sorry, that order could not be found. Please open the order form and start over.",
            Notice::DirectMessageOnly => "This command only works in a direct message with me.",
            Notice::NoOrdersYet => "No orders have been placed yet.",
        };
        f.write_str(text)
    }
}

const DAY_AND_TIME: &str = "%A %-d %B at %H:%M";

fn write_items(f: &mut fmt::Formatter<'_>, items: &[OrderItem]) -> fmt::Result {
    for item in items {
        write!(f, "\n• {}x {}", item.quantity, item.name)?;
    }
    Ok(())
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::Invitation { closes_at } => write!(
                f,
                "It's friet day! Open the order form to place your order. Ordering closes at {}.",
                closes_at.format("%H:%M")
            ),
            OutboundMessage::OrderingClosed { next_opening: Some(at) } => write!(
                f,
                "Ordering is closed. It opens again on {}.",
                at.format(DAY_AND_TIME)
            ),
            OutboundMessage::OrderingClosed { next_opening: None } => {
                f.write_str("Ordering is closed and no new round has been scheduled yet.")
            }
            OutboundMessage::QuantityPrompt { item_name } => write!(
                f,
                "How many {item_name} would you like? Reply with a number from {MIN_QUANTITY} to {MAX_QUANTITY}, or 0 / - to remove it."
            ),
            OutboundMessage::InvalidQuantity => write!(
                f,
                "Please reply with a number from {MIN_QUANTITY} to {MAX_QUANTITY}, or 0 / - to remove the item."
            ),
            OutboundMessage::OrderEmptied => {
                f.write_str("Your order is empty now. Open the order form to pick new items.")
            }
            OutboundMessage::OrderSummary { items, .. } => {
                f.write_str("Thanks! This is your order:")?;
                write_items(f, items)
            }
            OutboundMessage::OrderConfirmed { user_name, items } => {
                write!(f, "Order confirmed for {user_name}:")?;
                write_items(f, items)
            }
            OutboundMessage::Report(report) => write!(f, "{report}"),
            OutboundMessage::PingSummary(totals) if totals.is_empty() => {
                f.write_str("Nothing has been ordered yet.")
            }
            OutboundMessage::PingSummary(totals) => {
                f.write_str("Ordered so far:")?;
                for total in totals {
                    write!(f, "\n• {}x {}", total.quantity, total.name)?;
                }
                Ok(())
            }
            OutboundMessage::Notice(notice) => write!(f, "{notice}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Amsterdam;

    #[test]
    fn closed_message_names_the_next_opening_in_local_time() {
        let at = Amsterdam.with_ymd_and_hms(2026, 10, 23, 11, 0, 0).unwrap();
        let text = OutboundMessage::OrderingClosed { next_opening: Some(at) }.to_string();
        assert_eq!(text, "Ordering is closed. It opens again on Friday 23 October at 11:00.");
    }

    #[test]
    fn summary_lists_quantities() {
        let mut cola = OrderItem::selected("dranken", "cola", "Cola");
        cola.quantity = 2;
        let text = OutboundMessage::OrderConfirmed {
            user_name: "Alice".into(),
            items: vec![cola, OrderItem::selected("friet", "friet", "Friet")],
        }
        .to_string();
        assert_eq!(text, "Order confirmed for Alice:\n• 2x Cola\n• 1x Friet");
    }
}
