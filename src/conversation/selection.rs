//! The item selection form and how its submissions map onto order lines.

use crate::gateway::{FormBlock, FormSpec};
use crate::model::{MenuCatalog, OrderItem};
use std::collections::{HashMap, HashSet};

/// Callback id of the selection form, echoed back on submission.
pub const ORDER_FORM_CALLBACK: &str = "friet_order";

/// One picked option of the selection form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub category: String,
    pub item_id: String,
}

impl Selection {
    pub fn new(category: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            item_id: item_id.into(),
        }
    }
}

/// One optional multi-select per category that has something on offer.
pub fn order_form(menu: &dyn MenuCatalog) -> FormSpec {
    FormSpec {
        callback_id: ORDER_FORM_CALLBACK.to_string(),
        title: "Order friet".to_string(),
        submit: "Next".to_string(),
        blocks: menu
            .all_categories()
            .iter()
            .filter(|category| !category.items.is_empty())
            .map(|category| FormBlock {
                block_id: category.block_id(),
                action_id: category.action_id(),
                label: category.label.clone(),
                options: category.items.clone(),
            })
            .collect(),
    }
}

/// Submitted form values (block id → chosen option ids) in form order.
pub fn selections_from_form(
    menu: &dyn MenuCatalog,
    values: &HashMap<String, Vec<String>>,
) -> Vec<Selection> {
    menu.all_categories()
        .iter()
        .flat_map(|category| {
            values
                .get(&category.block_id())
                .into_iter()
                .flatten()
                .map(move |id| Selection::new(category.key.clone(), id.clone()))
        })
        .collect()
}

/// Block that carries the error of an empty submission.
pub fn first_block_id(menu: &dyn MenuCatalog) -> String {
    menu.all_categories()
        .first()
        .map(|category| category.block_id())
        .unwrap_or_default()
}

/// Fresh order lines for the selections. Unknown ids are skipped, repeats collapse.
pub fn resolve(menu: &dyn MenuCatalog, selections: &[Selection]) -> Vec<OrderItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for selection in selections {
        let Some(item) = menu.lookup(&selection.category, &selection.item_id) else {
            continue;
        };
        // Stored lines carry the menu's spelling of the category.
        let Some(category) = menu.category(&selection.category) else {
            continue;
        };
        let line = OrderItem::selected(&category.key, &item.id, &item.name);
        if seen.insert(line.key()) {
            items.push(line);
        }
    }
    items
}
