use thiserror::Error;
use uuid::Uuid;

/// Errors raised by [`crate::storage::TodoStore`] backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("list {0:?} not found")]
    ListNotFound(String),

    #[error("item {0} not found")]
    ItemNotFound(Uuid),

    #[error("list {0:?} already exists")]
    DuplicateList(String),

    #[error("unsupported store url {0:?}")]
    UnsupportedUrl(String),

    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
}

impl StoreError {
    /// True for errors describing a missing list or item.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ListNotFound(_) | Self::ItemNotFound(_))
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
