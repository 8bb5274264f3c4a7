//! Redis cache adapter.
//!
//! Values are stored as JSON text. Text written by other clients that is not
//! valid JSON reads back as a JSON string.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client;
use starter_types::domain::cache::{CacheKey, CacheValue, SetOptions};
use starter_types::domain::log::LogEntry;
use starter_types::ports::cache::{CacheError, CacheStore, HashCache};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::logger::LoggerService;

const STORE: &str = "RedisCacheService";

pub struct RedisCacheService {
    client: Client,
    logger: LoggerService,
    connection: OnceCell<MultiplexedConnection>,
}

fn backend(err: redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

fn encode(value: &CacheValue) -> Result<String, CacheError> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
}

/// Millisecond argument for PX/PEXPIRE, saturating instead of wrapping.
fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

fn decode(raw: String) -> CacheValue {
    serde_json::from_str(&raw).unwrap_or(CacheValue::String(raw))
}

impl RedisCacheService {
    pub fn new(url: &str, logger: LoggerService) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(backend)?;
        Ok(Self {
            client,
            logger,
            connection: OnceCell::new(),
        })
    }

    /// Multiplexed connections are cheap to clone and share one socket.
    fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.connection
            .get()
            .cloned()
            .ok_or(CacheError::Disconnected { store: STORE })
    }

    fn rejected(operation: &'static str, message: String) -> CacheError {
        CacheError::WriteRejected {
            store: STORE,
            operation,
            message,
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheService {
    fn store_name(&self) -> &'static str {
        STORE
    }

    async fn connect(&self) -> Result<(), CacheError> {
        self.connection
            .get_or_try_init(|| async {
                let conn = self
                    .client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(backend)?;
                self.logger.trace(LogEntry::new("Redis connected!"));
                Ok::<_, CacheError>(conn)
            })
            .await?;
        Ok(())
    }

    async fn is_connected(&self) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(reply) if reply == "PONG" => Ok(()),
            _ => Err(CacheError::Disconnected { store: STORE }),
        }
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<CacheValue>, CacheError> {
        let mut conn = self.connection()?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key.as_key())
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        if raw.is_none() {
            self.logger.warn(
                LogEntry::new(format!("key: {key} not found.")).with_context(STORE),
            );
        }
        Ok(raw.map(decode))
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: CacheValue,
        options: SetOptions,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        let encoded = encode(&value)?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key.as_key()).arg(&encoded);
        if let Some(ttl) = options.ttl.filter(|t| !t.is_zero()) {
            cmd.arg("PX").arg(millis(ttl));
        }
        if options.only_if_absent {
            cmd.arg("NX");
        }
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(backend)?;
        match reply.as_deref() {
            Some("OK") => Ok(()),
            _ => Err(Self::rejected(
                "set",
                format!("{key} {encoded}"),
            )),
        }
    }

    async fn del(&self, key: &CacheKey) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        let deleted: u64 = redis::cmd("DEL")
            .arg(key.as_key())
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        if deleted == 0 {
            return Err(Self::rejected("del", format!("cache key: {key} not deleted")));
        }
        Ok(())
    }

    async fn p_expire(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        let applied: u64 = redis::cmd("PEXPIRE")
            .arg(key.as_key())
            .arg(millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        if applied == 0 {
            return Err(Self::rejected(
                "pExpire",
                format!("set expire error key: {key}"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl HashCache for RedisCacheService {
    async fn h_get(&self, key: &CacheKey, field: &str) -> Result<Option<CacheValue>, CacheError> {
        let mut conn = self.connection()?;
        let raw: Option<String> = redis::cmd("HGET")
            .arg(key.as_key())
            .arg(field)
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(raw.map(decode))
    }

    async fn h_set(
        &self,
        key: &CacheKey,
        field: &str,
        value: CacheValue,
    ) -> Result<u64, CacheError> {
        let mut conn = self.connection()?;
        redis::cmd("HSET")
            .arg(key.as_key())
            .arg(field)
            .arg(encode(&value)?)
            .query_async(&mut conn)
            .await
            .map_err(backend)
    }

    async fn h_get_all(&self, key: &CacheKey) -> Result<HashMap<String, CacheValue>, CacheError> {
        let mut conn = self.connection()?;
        let raw: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(key.as_key())
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(raw.into_iter().map(|(k, v)| (k, decode(v))).collect())
    }

    async fn set_multi(&self, entries: Vec<(CacheKey, CacheValue)>) -> Result<(), CacheError> {
        let mut conn = self.connection()?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in &entries {
            pipe.cmd("RPUSH").arg(key.as_key()).arg(encode(value)?).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await.map_err(backend)?;
        Ok(())
    }
}
