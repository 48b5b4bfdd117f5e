//! List and item operations on top of a [`TodoStore`].
//!
//! The default list is the store's top-level items collection; every other
//! list name addresses a [`List`] document.

use crate::error::{Result, StoreError};
use crate::model::{capitalize, default_items, is_default_list, Item, List, DEFAULT_LIST};
use crate::storage::TodoStore;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of a read that creates its target when missing.
#[derive(Debug, PartialEq, Eq)]
pub enum Loaded<T> {
    Found(T),
    /// The target was missing and has just been seeded with the default items.
    Seeded,
}

/// Where a list page lives after normalizing a requested name.
#[derive(Debug, PartialEq, Eq)]
pub enum ListRoute {
    Default,
    Named(String),
}

impl ListRoute {
    /// Normalizes a URL path segment into a list route.
    pub fn from_segment(segment: &str) -> Self {
        let name = capitalize(segment);
        if is_default_list(&name) {
            Self::Default
        } else {
            Self::Named(name)
        }
    }
}

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn TodoStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TodoStore> {
        &self.store
    }

    /// Items of the default list, seeding the defaults when it is empty.
    pub async fn load_default(&self) -> Result<Loaded<Vec<Item>>> {
        let items = self.store.find_items().await?;
        if !items.is_empty() {
            return Ok(Loaded::Found(items));
        }
        if self.store.seed_items(default_items()).await? {
            info!(list = DEFAULT_LIST, "seeded default items");
        }
        Ok(Loaded::Seeded)
    }

    /// The list called `name`, created with the default items when missing.
    ///
    /// A concurrent creation of the same name is treated as found.
    pub async fn load_list(&self, name: &str) -> Result<Loaded<List>> {
        if let Some(list) = self.store.find_list(name).await? {
            return Ok(Loaded::Found(list));
        }
        match self.store.create_list(List::seeded(name)).await {
            Ok(()) => {
                info!(list = name, "created list");
                Ok(Loaded::Seeded)
            }
            Err(StoreError::DuplicateList(_)) => {
                debug!(list = name, "list created concurrently, reloading");
                self.store
                    .find_list(name)
                    .await?
                    .map(Loaded::Found)
                    .ok_or_else(|| StoreError::ListNotFound(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Adds a new item named `item_name` to `list`.
    pub async fn add_item(&self, list: &str, item_name: impl Into<String>) -> Result<Item> {
        let item = Item::new(item_name);
        if is_default_list(list) {
            self.store.insert_item(item.clone()).await?;
        } else {
            self.store.push_list_item(list, item.clone()).await?;
        }
        debug!(list, item = %item.id, "added item");
        Ok(item)
    }

    /// Removes the item with `id` from `list`.
    pub async fn delete_item(&self, list: &str, id: Uuid) -> Result<()> {
        if is_default_list(list) {
            self.store.delete_item(id).await?;
        } else {
            self.store.pull_list_item(list, id).await?;
        }
        debug!(list, item = %id, "deleted item");
        Ok(())
    }
}
