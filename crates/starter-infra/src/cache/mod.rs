//! Cache adapters.
//!
//! The two variants do not share one operation set: hash and list
//! operations are native to Redis, batch and existence checks to the
//! in-process store. The concrete services expose only what they support
//! (see [`HashCache`] and [`MultiKeyCache`]); [`Cache`] is the tagged handle
//! held by the infra aggregate and answers unsupported operations with
//! [`CacheError::NotImplemented`].

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

use starter_types::domain::cache::{CacheEntry, CacheKey, CacheValue, SetOptions};
use starter_types::ports::cache::{CacheError, CacheStore, HashCache, MultiKeyCache};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use memory::{MemoryCacheConfig, MemoryCacheService};
#[cfg(feature = "redis")]
pub use self::redis::RedisCacheService;

#[derive(Clone)]
pub enum Cache {
    Memory(Arc<MemoryCacheService>),
    #[cfg(feature = "redis")]
    Redis(Arc<RedisCacheService>),
}

impl Cache {
    fn store(&self) -> &dyn CacheStore {
        match self {
            Cache::Memory(c) => &**c,
            #[cfg(feature = "redis")]
            Cache::Redis(c) => &**c,
        }
    }

    fn hash(&self, operation: &'static str) -> Result<&dyn HashCache, CacheError> {
        match self {
            #[cfg(feature = "redis")]
            Cache::Redis(c) => Ok(&**c),
            other => Err(CacheError::NotImplemented {
                store: other.store_name(),
                operation,
            }),
        }
    }

    fn multi(&self, operation: &'static str) -> Result<&dyn MultiKeyCache, CacheError> {
        match self {
            Cache::Memory(c) => Ok(&**c),
            #[allow(unreachable_patterns)]
            other => Err(CacheError::NotImplemented {
                store: other.store_name(),
                operation,
            }),
        }
    }

    pub fn store_name(&self) -> &'static str {
        self.store().store_name()
    }

    pub async fn connect(&self) -> Result<(), CacheError> {
        self.store().connect().await
    }

    pub async fn is_connected(&self) -> Result<(), CacheError> {
        self.store().is_connected().await
    }

    pub async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError> {
        self.store().get(key).await
    }

    pub async fn set(
        &self,
        key: &CacheKey,
        value: CacheValue,
        options: SetOptions,
    ) -> Result<(), CacheError> {
        self.store().set(key, value, options).await
    }

    pub async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.store().del(key).await
    }

    pub async fn p_expire(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError> {
        self.store().p_expire(key, ttl).await
    }

    pub async fn h_get(
        &self,
        key: &CacheKey,
        field: &str,
    ) -> Result<Option<CacheValue>, CacheError> {
        self.hash("hGet")?.h_get(key, field).await
    }

    pub async fn h_set(
        &self,
        key: &CacheKey,
        field: &str,
        value: CacheValue,
    ) -> Result<u64, CacheError> {
        self.hash("hSet")?.h_set(key, field, value).await
    }

    pub async fn h_get_all(
        &self,
        key: &CacheKey,
    ) -> Result<HashMap<String, CacheValue>, CacheError> {
        self.hash("hGetAll")?.h_get_all(key).await
    }

    pub async fn set_multi(&self, entries: Vec<(CacheKey, CacheValue)>) -> Result<(), CacheError> {
        self.hash("setMulti")?.set_multi(entries).await
    }

    pub async fn m_set(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError> {
        self.multi("mSet")?.m_set(entries).await
    }

    pub async fn m_get(&self, keys: &[CacheKey]) -> Result<HashMap<String, CacheValue>, CacheError> {
        self.multi("mGet")?.m_get(keys).await
    }

    pub async fn has(&self, key: &CacheKey) -> Result<bool, CacheError> {
        self.multi("has")?.has(key).await
    }
}

impl From<MemoryCacheService> for Cache {
    fn from(service: MemoryCacheService) -> Self {
        Cache::Memory(Arc::new(service))
    }
}

#[cfg(feature = "redis")]
impl From<RedisCacheService> for Cache {
    fn from(service: RedisCacheService) -> Self {
        Cache::Redis(Arc::new(service))
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Cache").field(&self.store_name()).finish()
    }
}
