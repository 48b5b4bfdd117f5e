//! Documents stored by the todo hub: standalone items and named lists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the default list. It is backed by the top-level items collection,
/// not by a [`List`] document.
pub const DEFAULT_LIST: &str = "Today";

const DEFAULT_ITEM_NAMES: [&str; 3] = [
    "Welcome to your todo list.",
    "Hit + button to create a new item.",
    "<-- Hit this to delete an item.",
];

/// A single todo entry, either top-level or embedded in a [`List`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A named list with its embedded items in insertion order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct List {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl List {
    /// New list seeded with a fresh copy of the default items.
    pub fn seeded(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            items: default_items(),
        }
    }
}

/// Fresh default items, each with its own id.
pub fn default_items() -> Vec<Item> {
    DEFAULT_ITEM_NAMES.iter().map(|name| Item::new(*name)).collect()
}

/// Normalizes a list name taken from a URL path segment: the first character
/// is uppercased and the rest lowercased.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Whether `name` addresses the default list rather than a [`List`] document.
pub fn is_default_list(name: &str) -> bool {
    name == DEFAULT_LIST
}
