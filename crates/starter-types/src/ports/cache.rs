use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::cache::{CacheEntry, CacheKey, CacheValue, SetOptions};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("{store} disconnected.")]
    Disconnected { store: &'static str },

    #[error("cache {operation} error: {message}")]
    WriteRejected {
        store: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("{operation} is not implemented by {store}")]
    NotImplemented {
        store: &'static str,
        operation: &'static str,
    },

    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache value serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    pub fn store(&self) -> Option<&'static str> {
        match self {
            CacheError::Disconnected { store }
            | CacheError::WriteRejected { store, .. }
            | CacheError::NotImplemented { store, .. } => Some(*store),
            CacheError::Backend(_) | CacheError::Serialization(_) => None,
        }
    }
}

/// Operations every cache variant supports.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    fn store_name(&self) -> &'static str;

    async fn connect(&self) -> Result<(), CacheError>;

    /// Fails with [`CacheError::Disconnected`] until `connect` has succeeded.
    async fn is_connected(&self) -> Result<(), CacheError>;

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError>;

    async fn set(
        &self,
        key: &CacheKey,
        value: CacheValue,
        options: SetOptions,
    ) -> Result<(), CacheError>;

    /// A key that does not exist is reported as a rejected write.
    async fn del(&self, key: &CacheKey) -> Result<(), CacheError>;

    async fn p_expire(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError>;
}

/// Hash-field and list operations, native to networked stores.
#[async_trait]
pub trait HashCache: CacheStore {
    async fn h_get(&self, key: &CacheKey, field: &str) -> Result<Option<CacheValue>, CacheError>;

    /// Returns the number of fields newly created.
    async fn h_set(
        &self,
        key: &CacheKey,
        field: &str,
        value: CacheValue,
    ) -> Result<u64, CacheError>;

    async fn h_get_all(&self, key: &CacheKey) -> Result<HashMap<String, CacheValue>, CacheError>;

    /// Appends each value to the list stored at its key, atomically.
    async fn set_multi(&self, entries: Vec<(CacheKey, CacheValue)>) -> Result<(), CacheError>;
}

/// Batch and existence operations, native to in-process stores.
#[async_trait]
pub trait MultiKeyCache: CacheStore {
    async fn m_set(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError>;

    /// Only keys that are present and unexpired appear in the result.
    async fn m_get(&self, keys: &[CacheKey]) -> Result<HashMap<String, CacheValue>, CacheError>;

    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError>;
}
