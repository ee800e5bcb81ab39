use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
}

/// One row of the category table: the key stored on order items, the heading shown to
/// people, and the items on offer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub key: String,
    pub label: String,
    pub items: Vec<MenuItem>,
}

impl Category {
    /// Form block carrying this category's multi-select, e.g. `veggiesnacks_select`.
    pub fn block_id(&self) -> String {
        format!("{}_select", self.compact_key())
    }

    /// Action id of the multi-select inside [`Category::block_id`].
    pub fn action_id(&self) -> String {
        format!("{}_selection", self.compact_key())
    }

    fn compact_key(&self) -> String {
        self.key.replace('_', "")
    }
}

/// Read-only lookup of what can be ordered.
pub trait MenuCatalog: Send + Sync {
    /// Categories in form order.
    fn all_categories(&self) -> &[Category];

    fn lookup(&self, category: &str, id: &str) -> Option<MenuItem> {
        self.category(category)?
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    fn category(&self, key: &str) -> Option<&Category> {
        self.all_categories()
            .iter()
            .find(|category| category.key.eq_ignore_ascii_case(key))
    }

    /// Display label of a category key, falling back to the key itself.
    fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.category(key)
            .map(|category| category.label.as_str())
            .unwrap_or(key)
    }
}

#[derive(Debug, Deserialize)]
struct MenuFile {
    categories: Vec<Category>,
}

/// The menu shipped with the binary (`menu.yaml`).
#[derive(Clone, Debug)]
pub struct StaticMenu {
    categories: Vec<Category>,
}

impl StaticMenu {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let file: MenuFile = serde_yaml::from_str(content)?;
        Ok(Self::new(file.categories))
    }

    pub fn embedded() -> Result<Self, serde_yaml::Error> {
        Self::from_yaml(include_str!("../../menu.yaml"))
    }
}

impl MenuCatalog for StaticMenu {
    fn all_categories(&self) -> &[Category] {
        &self.categories
    }
}
