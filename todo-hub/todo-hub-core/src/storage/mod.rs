//! Document storage for items and lists.
//!
//! Two backends implement [`TodoStore`]:
//! - [`MemoryStore`]: process-local, selected with a `memory://` url
//! - [`RedisStore`]: Redis-backed, selected with a `redis://` or `rediss://` url

use crate::error::{Result, StoreError};
use crate::model::{Item, List};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Collection-level operations over the top-level items and the named lists.
///
/// Every mutation is atomic with respect to other callers of the same store.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Round-trip to the backend to check it is reachable.
    async fn ping(&self) -> Result<()>;

    /// All top-level items in insertion order.
    async fn find_items(&self) -> Result<Vec<Item>>;

    async fn insert_item(&self, item: Item) -> Result<()>;

    /// Inserts `items` only if the top-level collection is empty.
    /// Returns whether the items were inserted.
    async fn seed_items(&self, items: Vec<Item>) -> Result<bool>;

    /// Fails with [`StoreError::ItemNotFound`] when no item has this id.
    async fn delete_item(&self, id: Uuid) -> Result<()>;

    async fn find_list(&self, name: &str) -> Result<Option<List>>;

    /// Fails with [`StoreError::DuplicateList`] when a list with the same name
    /// already exists.
    async fn create_list(&self, list: List) -> Result<()>;

    /// Appends `item` to the named list.
    async fn push_list_item(&self, name: &str, item: Item) -> Result<()>;

    /// Removes the embedded item with `id` from the named list.
    async fn pull_list_item(&self, name: &str, id: Uuid) -> Result<()>;
}

/// Opens the store addressed by `url`.
///
/// Redis connections are established on first use, so an unreachable server
/// does not fail here.
pub fn open(url: &str) -> Result<Arc<dyn TodoStore>> {
    let scheme = url.split_once("://").map(|(scheme, _)| scheme);
    match scheme {
        Some("memory") => Ok(Arc::new(MemoryStore::new())),
        Some("redis") | Some("rediss") => Ok(Arc::new(RedisStore::open(url)?)),
        _ => Err(StoreError::UnsupportedUrl(url.to_string())),
    }
}
