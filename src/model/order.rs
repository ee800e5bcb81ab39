use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Lowest quantity an item can hold.
pub const MIN_QUANTITY: u8 = 1;
/// Highest quantity an item can hold.
pub const MAX_QUANTITY: u8 = 10;

/// Chat-platform id of a participant. Key of the order store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Addresses one line of an order as `<category>_<item id>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(category: &str, id: &str) -> Self {
        Self(format!("{category}_{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    #[serde(rename = "type")]
    pub category: String,
    pub name: String,
    pub quantity: u8,
    pub needs_quantity: bool,
}

impl OrderItem {
    /// A freshly selected line: one of it, quantity still to be asked.
    pub fn selected(category: &str, id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            name: name.to_string(),
            quantity: MIN_QUANTITY,
            needs_quantity: true,
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(&self.category, &self.id)
    }
}

/// Direction of a quantity button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityDelta {
    Increment,
    Decrement,
}

/// Where the conversation of a stored order stands. A user without a stored order has not
/// started one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    /// An order exists but holds no items.
    Selecting,
    /// Waiting for the quantity of the item at this position.
    AwaitingQuantity(usize),
    Complete,
}

/// What follows after the current item has been answered or removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Prompt(OrderItem),
    Complete,
    Emptied,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Quantity {quantity} of {item} outside 1..=10")]
    QuantityOutOfRange { item: ItemKey, quantity: u8 },

    #[error("Item selected twice: {0}")]
    DuplicateItem(ItemKey),

    /// The current item is missing or no longer waits for a quantity.
    #[error("Current item {0} is not awaiting a quantity")]
    DanglingFocus(ItemKey),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemKey),

    #[error("No item is awaiting a quantity")]
    NoCurrentItem,
}

/// One participant's order for the running cycle.
///
/// The field names are the persisted record layout. `current_item_id` stays a plain key on
/// disk; in memory it is only reachable through [`Order::state`] and the focus operations,
/// which keep it pointing at an item that still needs a quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub order_id: Option<OrderId>,
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    current_item_id: Option<ItemKey>,
}

impl Order {
    pub fn new(user_id: UserId, user_name: impl Into<String>) -> Self {
        Self {
            order_id: None,
            user_id,
            user_name: user_name.into(),
            items: Vec::new(),
            current_item_id: None,
        }
    }

    pub fn current_item_id(&self) -> Option<&ItemKey> {
        self.current_item_id.as_ref()
    }

    pub fn state(&self) -> Result<ConversationState, OrderError> {
        match &self.current_item_id {
            Some(key) => match self.position(key) {
                Some(index) if self.items[index].needs_quantity => {
                    Ok(ConversationState::AwaitingQuantity(index))
                }
                _ => Err(OrderError::DanglingFocus(key.clone())),
            },
            None if self.items.is_empty() => Ok(ConversationState::Selecting),
            None => Ok(ConversationState::Complete),
        }
    }

    pub fn current_item(&self) -> Option<&OrderItem> {
        let key = self.current_item_id.as_ref()?;
        self.items.iter().find(|item| &item.key() == key)
    }

    /// Replaces the whole selection and focuses its first item.
    pub fn replace_items(&mut self, items: Vec<OrderItem>) -> Option<&OrderItem> {
        self.items = items;
        self.current_item_id = None;
        self.focus_next_pending()
    }

    /// Stores the answer for the current item.
    pub fn answer_current(&mut self, quantity: u8) -> Result<(), OrderError> {
        let key = self.current_key()?;
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            return Err(OrderError::QuantityOutOfRange { item: key, quantity });
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.key() == key)
            .ok_or(OrderError::ItemNotFound(key))?;
        item.quantity = quantity;
        item.needs_quantity = false;
        Ok(())
    }

    /// Drops the current item, whatever quantity it had.
    pub fn remove_current(&mut self) -> Result<OrderItem, OrderError> {
        let key = self.current_key()?;
        let index = self.position(&key).ok_or(OrderError::ItemNotFound(key))?;
        self.current_item_id = None;
        Ok(self.items.remove(index))
    }

    /// Moves the focus to the next item still needing a quantity, in selection order.
    pub fn advance(&mut self) -> Advance {
        self.current_item_id = None;
        if self.items.is_empty() {
            return Advance::Emptied;
        }
        match self.focus_next_pending() {
            Some(item) => Advance::Prompt(item.clone()),
            None => Advance::Complete,
        }
    }

    /// Steps one item's quantity up or down, staying within range.
    pub fn adjust_quantity(&mut self, key: &ItemKey, delta: QuantityDelta) -> Result<u8, OrderError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| &item.key() == key)
            .ok_or_else(|| OrderError::ItemNotFound(key.clone()))?;
        item.quantity = match delta {
            QuantityDelta::Increment => item.quantity.saturating_add(1),
            QuantityDelta::Decrement => item.quantity.saturating_sub(1),
        }
        .clamp(MIN_QUANTITY, MAX_QUANTITY);
        Ok(item.quantity)
    }

    /// Checks the invariants every stored order satisfies.
    pub fn validate(&self) -> Result<(), OrderError> {
        let mut seen = std::collections::HashSet::new();
        for item in &self.items {
            let key = item.key();
            if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&item.quantity) {
                return Err(OrderError::QuantityOutOfRange {
                    item: key,
                    quantity: item.quantity,
                });
            }
            if !seen.insert(key.clone()) {
                return Err(OrderError::DuplicateItem(key));
            }
        }
        self.state().map(|_| ())
    }

    fn current_key(&self) -> Result<ItemKey, OrderError> {
        self.current_item_id.clone().ok_or(OrderError::NoCurrentItem)
    }

    fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|item| &item.key() == key)
    }

    fn focus_next_pending(&mut self) -> Option<&OrderItem> {
        let next = self.items.iter().find(|item| item.needs_quantity)?;
        self.current_item_id = Some(next.key());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_with(items: &[(&str, &str, &str)]) -> Order {
        let mut order = Order::new(UserId::new("U1"), "Alice");
        order.replace_items(
            items
                .iter()
                .map(|(category, id, name)| OrderItem::selected(category, id, name))
                .collect(),
        );
        order
    }

    #[test]
    fn n_items_need_n_answers_in_selection_order() {
        let mut order = order_with(&[
            ("dranken", "cola", "Cola"),
            ("friet", "friet", "Friet"),
            ("snacks", "kroket", "Kroket"),
        ]);
        assert_eq!(order.state(), Ok(ConversationState::AwaitingQuantity(0)));

        let mut prompts = vec![order.current_item().unwrap().name.clone()];
        loop {
            order.answer_current(2).unwrap();
            match order.advance() {
                Advance::Prompt(item) => prompts.push(item.name),
                Advance::Complete => break,
                Advance::Emptied => panic!("nothing was removed"),
            }
        }
        assert_eq!(prompts, vec!["Cola", "Friet", "Kroket"]);
        assert_eq!(order.state(), Ok(ConversationState::Complete));
        assert!(order.items.iter().all(|item| item.quantity == 2 && !item.needs_quantity));
    }

    #[test]
    fn removing_the_last_item_clears_the_focus() {
        let mut order = order_with(&[("dranken", "cola", "Cola")]);
        let removed = order.remove_current().unwrap();
        assert_eq!(removed.id, "cola");
        assert_eq!(order.advance(), Advance::Emptied);
        assert_eq!(order.current_item_id(), None);
        assert_eq!(order.state(), Ok(ConversationState::Selecting));
    }

    #[test]
    fn removal_skips_to_next_pending_item() {
        let mut order = order_with(&[("dranken", "cola", "Cola"), ("friet", "friet", "Friet")]);
        order.remove_current().unwrap();
        assert_eq!(order.advance(), Advance::Prompt(OrderItem::selected("friet", "friet", "Friet")));
        assert_eq!(order.current_item_id(), Some(&ItemKey::from("friet_friet")));
    }

    #[test]
    fn adjust_quantity_is_clamped() {
        let mut order = order_with(&[("dranken", "cola", "Cola")]);
        let key = ItemKey::from("dranken_cola");
        assert_eq!(order.adjust_quantity(&key, QuantityDelta::Decrement), Ok(1));
        for _ in 0..12 {
            order.adjust_quantity(&key, QuantityDelta::Increment).unwrap();
        }
        assert_eq!(order.items[0].quantity, MAX_QUANTITY);
        assert_eq!(
            order.adjust_quantity(&ItemKey::from("dranken_fanta"), QuantityDelta::Increment),
            Err(OrderError::ItemNotFound(ItemKey::from("dranken_fanta")))
        );
    }

    #[test]
    fn validate_flags_broken_orders() {
        let mut order = order_with(&[("dranken", "cola", "Cola"), ("dranken", "cola", "Cola")]);
        assert_eq!(
            order.validate(),
            Err(OrderError::DuplicateItem(ItemKey::from("dranken_cola")))
        );

        order.items.pop();
        order.items[0].quantity = 0;
        assert!(matches!(order.validate(), Err(OrderError::QuantityOutOfRange { .. })));
    }

    #[test]
    fn persisted_layout_is_unchanged() {
        let mut order = order_with(&[("dranken", "cola", "Cola")]);
        order.order_id = Some("6f1c1c8e-3b7e-4a53-9d1e-1a0f1f6b2a10".parse().unwrap());
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["order_id"], "6f1c1c8e-3b7e-4a53-9d1e-1a0f1f6b2a10");
        assert_eq!(json["user_id"], "U1");
        assert_eq!(json["user_name"], "Alice");
        assert_eq!(json["current_item_id"], "dranken_cola");
        assert_eq!(json["items"][0]["type"], "dranken");
        assert_eq!(json["items"][0]["needs_quantity"], true);

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn dangling_focus_from_storage_is_detected() {
        let record = r#"{
            "order_id": null,
            "user_id": "U2",
            "user_name": "Bob",
            "items": [],
            "current_item_id": "friet_friet"
        }"#;
        let order: Order = serde_json::from_str(record).unwrap();
        assert_eq!(
            order.state(),
            Err(OrderError::DanglingFocus(ItemKey::from("friet_friet")))
        );
    }
}
