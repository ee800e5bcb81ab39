//! Folds every stored order into the consolidated order of the cycle.

use crate::model::{MenuCatalog, Order};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemTotal {
    pub id: String,
    pub name: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotals {
    pub category: String,
    /// Heading to print; the category key until [`OrderReport::labelled`] is applied.
    pub label: String,
    /// Sorted by item name.
    pub items: Vec<ItemTotal>,
}

/// Per-category, per-item totals. Categories are sorted by key and never empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderReport {
    pub categories: Vec<CategoryTotals>,
}

impl OrderReport {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum of every item quantity in the report.
    pub fn total_items(&self) -> u32 {
        self.categories
            .iter()
            .flat_map(|category| &category.items)
            .map(|item| item.quantity)
            .sum()
    }

    /// Replaces category keys by their menu labels.
    pub fn labelled(mut self, menu: &dyn MenuCatalog) -> Self {
        for category in &mut self.categories {
            category.label = menu.label(&category.category).to_string();
        }
        self
    }
}

impl fmt::Display for OrderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No orders this week.");
        }
        f.write_str("This week's order:")?;
        for category in &self.categories {
            write!(f, "\n\n*{}*", category.label)?;
            for item in &category.items {
                write!(f, "\n• {}x {}", item.quantity, item.name)?;
            }
        }
        write!(f, "\n\nTotal items: {}", self.total_items())
    }
}

pub fn build_report(orders: &[Order]) -> OrderReport {
    // category -> item id -> (name, quantity)
    let mut grouped: BTreeMap<&str, BTreeMap<&str, (&str, u32)>> = BTreeMap::new();
    for item in orders.iter().flat_map(|order| &order.items) {
        if item.quantity == 0 {
            continue;
        }
        let entry = grouped
            .entry(item.category.as_str())
            .or_default()
            .entry(item.id.as_str())
            .or_insert((item.name.as_str(), 0));
        entry.1 += u32::from(item.quantity);
    }

    let categories = grouped
        .into_iter()
        .map(|(category, items)| {
            let mut items: Vec<ItemTotal> = items
                .into_iter()
                .map(|(id, (name, quantity))| ItemTotal {
                    id: id.to_string(),
                    name: name.to_string(),
                    quantity,
                })
                .collect();
            items.sort_by(|a, b| a.name.cmp(&b.name));
            CategoryTotals {
                category: category.to_string(),
                label: category.to_string(),
                items,
            }
        })
        .collect();

    OrderReport { categories }
}

/// Item name → total across all categories, sorted by name.
pub fn build_ping_summary(orders: &[Order]) -> Vec<ItemTotal> {
    let mut totals: BTreeMap<&str, (&str, u32)> = BTreeMap::new();
    for item in orders.iter().flat_map(|order| &order.items) {
        if item.quantity == 0 {
            continue;
        }
        let entry = totals
            .entry(item.name.as_str())
            .or_insert((item.id.as_str(), 0));
        entry.1 += u32::from(item.quantity);
    }
    totals
        .into_iter()
        .map(|(name, (id, quantity))| ItemTotal {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
        })
        .collect()
}
