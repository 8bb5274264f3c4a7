use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use starter_types::domain::cache::{CacheEntry, CacheKey, CacheValue, SetOptions};
use starter_types::domain::log::LogEntry;
use starter_types::ports::cache::{CacheError, CacheStore, MultiKeyCache};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::logger::LoggerService;

const STORE: &str = "MemoryCacheService";

#[derive(Clone, Debug)]
pub struct MemoryCacheConfig {
    /// Applied when a write carries no ttl. Zero means entries never expire.
    pub std_ttl: Duration,
    /// Interval of the background sweep. Zero disables it.
    pub check_period: Duration,
    pub max_keys: Option<usize>,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            std_ttl: Duration::from_secs(3600),
            check_period: Duration::from_secs(3600),
            max_keys: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

type Store = DashMap<String, Slot>;

pub struct MemoryCacheService {
    config: MemoryCacheConfig,
    logger: LoggerService,
    client: OnceLock<Arc<Store>>,
    /// Serializes the key-limit check with the insert it guards.
    admission: Mutex<()>,
}

impl MemoryCacheService {
    pub fn new(logger: LoggerService) -> Self {
        Self::with_config(logger, MemoryCacheConfig::default())
    }

    pub fn with_config(logger: LoggerService, config: MemoryCacheConfig) -> Self {
        Self {
            config,
            logger,
            client: OnceLock::new(),
            admission: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &MemoryCacheConfig {
        &self.config
    }

    fn client(&self) -> Result<&Arc<Store>, CacheError> {
        self.client
            .get()
            .ok_or(CacheError::Disconnected { store: STORE })
    }

    fn expiry(&self, ttl: Option<Duration>, now: Instant) -> Option<Instant> {
        let ttl = ttl.unwrap_or(self.config.std_ttl);
        if ttl.is_zero() {
            None
        } else {
            // Past the representable range means never.
            now.checked_add(ttl)
        }
    }

    fn is_live(store: &Store, key: &str, now: Instant) -> bool {
        store.get(key).is_some_and(|slot| !slot.is_expired(now))
    }

    async fn write(
        &self,
        store: &Store,
        key: String,
        value: CacheValue,
        ttl: Option<Duration>,
        only_if_absent: bool,
    ) -> Result<(), CacheError> {
        let _admission = match self.config.max_keys {
            Some(_) => Some(self.admission.lock().await),
            None => None,
        };
        let now = Instant::now();
        if let Some(max) = self.config.max_keys {
            if !Self::is_live(store, &key, now) {
                store.retain(|_, slot| !slot.is_expired(now));
                if store.len() >= max {
                    return Err(CacheError::WriteRejected {
                        store: STORE,
                        operation: "set",
                        message: format!("{key}: max keys amount exceeded"),
                    });
                }
            }
        }

        let slot = Slot {
            value,
            expires_at: self.expiry(ttl, now),
        };
        match store.entry(key) {
            Entry::Occupied(mut occupied) => {
                if only_if_absent && !occupied.get().is_expired(now) {
                    return Err(CacheError::WriteRejected {
                        store: STORE,
                        operation: "set",
                        message: format!("{} already exists", occupied.key()),
                    });
                }
                occupied.insert(slot);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
            }
        }
        Ok(())
    }

    fn read(store: &Store, key: &str, now: Instant) -> Option<CacheValue> {
        let hit = store
            .get(key)
            .map(|slot| (slot.value.clone(), slot.is_expired(now)));
        match hit {
            Some((value, false)) => Some(value),
            Some((_, true)) => {
                store.remove_if(key, |_, slot| slot.is_expired(now));
                None
            }
            None => None,
        }
    }
}

fn spawn_sweeper(store: Weak<Store>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(store) = store.upgrade() else {
                break;
            };
            let now = Instant::now();
            store.retain(|_, slot| !slot.is_expired(now));
        }
    });
}

#[async_trait]
impl CacheStore for MemoryCacheService {
    fn store_name(&self) -> &'static str {
        STORE
    }

    async fn connect(&self) -> Result<(), CacheError> {
        let store = Arc::new(Store::new());
        if self.client.set(store.clone()).is_ok() {
            if !self.config.check_period.is_zero() {
                spawn_sweeper(Arc::downgrade(&store), self.config.check_period);
            }
            self.logger.trace(LogEntry::new("CacheMemory connected!"));
        }
        Ok(())
    }

    async fn is_connected(&self) -> Result<(), CacheError> {
        self.client().map(|_| ())
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError> {
        let store = self.client()?;
        Ok(Self::read(store, &key.as_key(), Instant::now()))
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: CacheValue,
        options: SetOptions,
    ) -> Result<(), CacheError> {
        let store = self.client()?;
        self.write(
            store,
            key.as_key(),
            value,
            options.ttl,
            options.only_if_absent,
        )
        .await
    }

    async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        let store = self.client()?;
        let now = Instant::now();
        match store.remove(&key.as_key()) {
            Some((_, slot)) if !slot.is_expired(now) => Ok(()),
            _ => Err(CacheError::WriteRejected {
                store: STORE,
                operation: "del",
                message: format!("cache key: {key} not deleted"),
            }),
        }
    }

    async fn p_expire(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError> {
        let store = self.client()?;
        let now = Instant::now();
        let name = key.as_key();
        let updated = match store.get_mut(&name) {
            Some(mut slot) if !slot.is_expired(now) => {
                slot.expires_at = now.checked_add(ttl);
                true
            }
            _ => false,
        };
        if !updated {
            return Err(CacheError::WriteRejected {
                store: STORE,
                operation: "pExpire",
                message: format!("set expire error key: {key}"),
            });
        }
        if ttl.is_zero() {
            store.remove(&name);
        }
        Ok(())
    }
}

#[async_trait]
impl MultiKeyCache for MemoryCacheService {
    async fn m_set(&self, entries: Vec<CacheEntry>) -> Result<(), CacheError> {
        let store = self.client()?;
        for entry in entries {
            self.write(store, entry.key.as_key(), entry.value, entry.ttl, false)
                .await?;
        }
        Ok(())
    }

    async fn m_get(&self, keys: &[CacheKey]) -> Result<HashMap<String, CacheValue>, CacheError> {
        let store = self.client()?;
        let now = Instant::now();
        Ok(keys
            .iter()
            .filter_map(|key| {
                let name = key.as_key();
                Self::read(store, &name, now).map(|value| (name, value))
            })
            .collect())
    }

    async fn has(&self, key: &CacheKey) -> Result<bool, CacheError> {
        let store = self.client()?;
        Ok(Self::is_live(store, &key.as_key(), Instant::now()))
    }
}
