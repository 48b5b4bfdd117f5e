//! Redis-backed document store.
//!
//! Layout under the key prefix (default `todo`):
//! - `{prefix}:items`: list of JSON item documents (the default list)
//! - `{prefix}:lists`: hash of list name to JSON list header `{id, name}`
//! - `{prefix}:lists:{name}:items`: list of JSON item documents for one list
//!
//! Every mutation is a Lua script, so it runs as one atomic step on the server.

use super::TodoStore;
use crate::error::{Result, StoreError};
use crate::model::{Item, List};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_PREFIX: &str = "todo";

const SEED_ITEMS: &str = r#"
if redis.call('LLEN', KEYS[1]) > 0 then
    return 0
end
for i = 1, #ARGV do
    redis.call('RPUSH', KEYS[1], ARGV[i])
end
return 1
"#;

const DELETE_ITEM: &str = r#"
local docs = redis.call('LRANGE', KEYS[1], 0, -1)
for _, raw in ipairs(docs) do
    if cjson.decode(raw).id == ARGV[1] then
        redis.call('LREM', KEYS[1], 1, raw)
        return 1
    end
end
return 0
"#;

const CREATE_LIST: &str = r#"
if redis.call('HSETNX', KEYS[1], ARGV[1], ARGV[2]) == 0 then
    return 0
end
redis.call('DEL', KEYS[2])
for i = 3, #ARGV do
    redis.call('RPUSH', KEYS[2], ARGV[i])
end
return 1
"#;

const PUSH_LIST_ITEM: &str = r#"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 0 then
    return 0
end
redis.call('RPUSH', KEYS[2], ARGV[2])
return 1
"#;

// -1: no such list, 0: no such item, 1: removed
const PULL_LIST_ITEM: &str = r#"
if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 0 then
    return -1
end
local docs = redis.call('LRANGE', KEYS[2], 0, -1)
for _, raw in ipairs(docs) do
    if cjson.decode(raw).id == ARGV[2] then
        redis.call('LREM', KEYS[2], 1, raw)
        return 1
    end
end
return 0
"#;

/// List document minus its items, which live under their own key.
#[derive(Serialize, Deserialize)]
struct ListHeader {
    id: Uuid,
    name: String,
}

struct Scripts {
    seed_items: Script,
    delete_item: Script,
    create_list: Script,
    push_list_item: Script,
    pull_list_item: Script,
}

impl Scripts {
    fn new() -> Self {
        Self {
            seed_items: Script::new(SEED_ITEMS),
            delete_item: Script::new(DELETE_ITEM),
            create_list: Script::new(CREATE_LIST),
            push_list_item: Script::new(PUSH_LIST_ITEM),
            pull_list_item: Script::new(PULL_LIST_ITEM),
        }
    }
}

pub struct RedisStore {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    prefix: String,
    scripts: Scripts,
}

impl RedisStore {
    /// Parses `url` without connecting. The connection is made on first use
    /// and retried on later calls until it succeeds.
    pub fn open(url: &str) -> Result<Self> {
        Self::with_prefix(url, DEFAULT_PREFIX)
    }

    pub fn with_prefix(url: &str, prefix: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::open(url)?,
            conn: OnceCell::new(),
            prefix: prefix.into(),
            scripts: Scripts::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.client.get_connection_manager().await?;
                info!(prefix = %self.prefix, "connected to redis");
                Ok::<_, StoreError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }

    fn items_key(&self) -> String {
        format!("{}:items", self.prefix)
    }

    fn lists_key(&self) -> String {
        format!("{}:lists", self.prefix)
    }

    fn list_items_key(&self, name: &str) -> String {
        format!("{}:lists:{}:items", self.prefix, name)
    }
}

fn decode_items(docs: &[String]) -> Result<Vec<Item>> {
    docs.iter()
        .map(|raw| serde_json::from_str(raw).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl TodoStore for RedisStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn find_items(&self) -> Result<Vec<Item>> {
        let mut conn = self.connection().await?;
        let docs: Vec<String> = redis::cmd("LRANGE")
            .arg(self.items_key())
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;
        decode_items(&docs)
    }

    async fn insert_item(&self, item: Item) -> Result<()> {
        let doc = serde_json::to_string(&item)?;
        let mut conn = self.connection().await?;
        let _: i64 = redis::cmd("RPUSH")
            .arg(self.items_key())
            .arg(doc)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn seed_items(&self, items: Vec<Item>) -> Result<bool> {
        let mut invocation = self.scripts.seed_items.prepare_invoke();
        invocation.key(self.items_key());
        for item in &items {
            invocation.arg(serde_json::to_string(item)?);
        }
        let mut conn = self.connection().await?;
        let seeded: i64 = invocation.invoke_async(&mut conn).await?;
        debug!(seeded = seeded == 1, "seed default items");
        Ok(seeded == 1)
    }

    async fn delete_item(&self, id: Uuid) -> Result<()> {
        let mut conn = self.connection().await?;
        let removed: i64 = self
            .scripts
            .delete_item
            .key(self.items_key())
            .arg(id.to_string())
            .invoke_async(&mut conn)
            .await?;
        if removed == 1 {
            Ok(())
        } else {
            Err(StoreError::ItemNotFound(id))
        }
    }

    async fn find_list(&self, name: &str) -> Result<Option<List>> {
        let mut conn = self.connection().await?;
        let (header, docs): (Option<String>, Vec<String>) = redis::pipe()
            .atomic()
            .hget(self.lists_key(), name)
            .lrange(self.list_items_key(name), 0, -1)
            .query_async(&mut conn)
            .await?;
        let Some(header) = header else {
            return Ok(None);
        };
        let header: ListHeader = serde_json::from_str(&header)?;
        Ok(Some(List {
            id: header.id,
            name: header.name,
            items: decode_items(&docs)?,
        }))
    }

    async fn create_list(&self, list: List) -> Result<()> {
        let header = serde_json::to_string(&ListHeader {
            id: list.id,
            name: list.name.clone(),
        })?;
        let mut invocation = self.scripts.create_list.prepare_invoke();
        invocation
            .key(self.lists_key())
            .key(self.list_items_key(&list.name))
            .arg(&list.name)
            .arg(header);
        for item in &list.items {
            invocation.arg(serde_json::to_string(item)?);
        }
        let mut conn = self.connection().await?;
        let created: i64 = invocation.invoke_async(&mut conn).await?;
        if created == 1 {
            Ok(())
        } else {
            Err(StoreError::DuplicateList(list.name))
        }
    }

    async fn push_list_item(&self, name: &str, item: Item) -> Result<()> {
        let doc = serde_json::to_string(&item)?;
        let mut conn = self.connection().await?;
        let pushed: i64 = self
            .scripts
            .push_list_item
            .key(self.lists_key())
            .key(self.list_items_key(name))
            .arg(name)
            .arg(doc)
            .invoke_async(&mut conn)
            .await?;
        if pushed == 1 {
            Ok(())
        } else {
            Err(StoreError::ListNotFound(name.to_string()))
        }
    }

    async fn pull_list_item(&self, name: &str, id: Uuid) -> Result<()> {
        let mut conn = self.connection().await?;
        let pulled: i64 = self
            .scripts
            .pull_list_item
            .key(self.lists_key())
            .key(self.list_items_key(name))
            .arg(name)
            .arg(id.to_string())
            .invoke_async(&mut conn)
            .await?;
        match pulled {
            1 => Ok(()),
            0 => Err(StoreError::ItemNotFound(id)),
            _ => Err(StoreError::ListNotFound(name.to_string())),
        }
    }
}
