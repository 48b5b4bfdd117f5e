use super::TodoStore;
use crate::error::{Result, StoreError};
use crate::model::{Item, List};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    items: Vec<Item>,
    lists: HashMap<String, List>,
}

/// In-memory store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_items(&self) -> Result<Vec<Item>> {
        Ok(self.inner.read().await.items.clone())
    }

    async fn insert_item(&self, item: Item) -> Result<()> {
        self.inner.write().await.items.push(item);
        Ok(())
    }

    async fn seed_items(&self, items: Vec<Item>) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if !inner.items.is_empty() {
            return Ok(false);
        }
        inner.items = items;
        Ok(true)
    }

    async fn delete_item(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let pos = inner
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::ItemNotFound(id))?;
        inner.items.remove(pos);
        Ok(())
    }

    async fn find_list(&self, name: &str) -> Result<Option<List>> {
        Ok(self.inner.read().await.lists.get(name).cloned())
    }

    async fn create_list(&self, list: List) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.lists.contains_key(&list.name) {
            return Err(StoreError::DuplicateList(list.name));
        }
        inner.lists.insert(list.name.clone(), list);
        Ok(())
    }

    async fn push_list_item(&self, name: &str, item: Item) -> Result<()> {
        let mut inner = self.inner.write().await;
        let list = inner
            .lists
            .get_mut(name)
            .ok_or_else(|| StoreError::ListNotFound(name.to_string()))?;
        list.items.push(item);
        Ok(())
    }

    async fn pull_list_item(&self, name: &str, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let list = inner
            .lists
            .get_mut(name)
            .ok_or_else(|| StoreError::ListNotFound(name.to_string()))?;
        let pos = list
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::ItemNotFound(id))?;
        list.items.remove(pos);
        Ok(())
    }
}
