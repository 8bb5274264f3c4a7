use serde_json::json;
use starter_infra::cache::{MemoryCacheConfig, MemoryCacheService};
use starter_infra::{LogBuffer, LoggerService};
use starter_types::domain::cache::{CacheEntry, CacheKey, SetOptions};
use starter_types::ports::cache::{CacheError, CacheStore, MultiKeyCache};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

fn logger() -> LoggerService {
    LoggerService::new("memory-cache-test")
}

async fn connected(config: MemoryCacheConfig) -> MemoryCacheService {
    let cache = MemoryCacheService::with_config(logger(), config);
    cache.connect().await.unwrap();
    cache
}

#[tokio::test]
async fn operations_before_connect_are_disconnected() {
    let cache = MemoryCacheService::new(logger());
    let key = CacheKey::from("k");
    assert_eq!(
        cache.is_connected().await,
        Err(CacheError::Disconnected {
            store: "MemoryCacheService"
        })
    );
    assert!(matches!(
        cache.get(&key).await,
        Err(CacheError::Disconnected { .. })
    ));
    assert!(matches!(
        cache.set(&key, json!(1), SetOptions::default()).await,
        Err(CacheError::Disconnected { .. })
    ));

    cache.connect().await.unwrap();
    assert!(cache.is_connected().await.is_ok());
}

#[tokio::test]
async fn connect_logs_once() {
    let buffer = LogBuffer::new();
    let logger = LoggerService::with_writer("starter", buffer.clone(), LevelFilter::TRACE);
    let cache = MemoryCacheService::new(logger);
    cache.connect().await.unwrap();
    cache.connect().await.unwrap();
    assert_eq!(buffer.lines_containing("CacheMemory connected!").len(), 1);
}

#[tokio::test]
async fn set_then_get_returns_value() {
    let cache = connected(MemoryCacheConfig::default()).await;
    let key = CacheKey::from("user:1");
    let value = json!({ "name": "Ada", "roles": ["admin"] });
    cache
        .set(&key, value.clone(), SetOptions::default())
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(value));

    let numeric = CacheKey::from(7);
    cache
        .set(&numeric, json!("seven"), SetOptions::default())
        .await
        .unwrap();
    assert_eq!(
        cache.get(&CacheKey::from("7")).await.unwrap(),
        Some(json!("seven"))
    );
}

#[tokio::test]
async fn expired_entries_are_invisible() {
    let cache = connected(MemoryCacheConfig::default()).await;
    let key = CacheKey::from("short");
    cache
        .set(&key, json!(1), SetOptions::ttl(Duration::from_millis(30)))
        .await
        .unwrap();
    assert!(cache.has(&key).await.unwrap());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get(&key).await.unwrap(), None);
    assert!(!cache.has(&key).await.unwrap());
}

#[tokio::test]
async fn zero_std_ttl_never_expires() {
    let cache = connected(MemoryCacheConfig {
        std_ttl: Duration::ZERO,
        ..Default::default()
    })
    .await;
    let key = CacheKey::from("forever");
    cache.set(&key, json!(true), SetOptions::default()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(cache.get(&key).await.unwrap(), Some(json!(true)));
}

#[tokio::test]
async fn only_if_absent_rejects_existing_keys() {
    let cache = connected(MemoryCacheConfig::default()).await;
    let key = CacheKey::from("lock");
    cache
        .set(&key, json!("a"), SetOptions::default().only_if_absent())
        .await
        .unwrap();
    let second = cache
        .set(&key, json!("b"), SetOptions::default().only_if_absent())
        .await;
    assert!(matches!(second, Err(CacheError::WriteRejected { .. })));
    assert_eq!(cache.get(&key).await.unwrap(), Some(json!("a")));
}

#[tokio::test]
async fn max_keys_rejects_new_keys_but_allows_overwrites() {
    let cache = connected(MemoryCacheConfig {
        max_keys: Some(1),
        ..Default::default()
    })
    .await;
    let first = CacheKey::from("first");
    cache.set(&first, json!(1), SetOptions::default()).await.unwrap();
    cache.set(&first, json!(2), SetOptions::default()).await.unwrap();

    let err = cache
        .set(&CacheKey::from("second"), json!(3), SetOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CacheError::WriteRejected {
            operation: "set",
            ..
        }
    ));
    assert_eq!(cache.get(&first).await.unwrap(), Some(json!(2)));
}

#[tokio::test]
async fn del_and_p_expire_on_missing_keys_are_rejected() {
    let cache = connected(MemoryCacheConfig::default()).await;
    let key = CacheKey::from("gone");
    assert!(matches!(
        cache.del(&key).await,
        Err(CacheError::WriteRejected { operation: "del", .. })
    ));
    assert!(matches!(
        cache.p_expire(&key, Duration::from_secs(1)).await,
        Err(CacheError::WriteRejected {
            operation: "pExpire",
            ..
        })
    ));

    cache.set(&key, json!(1), SetOptions::default()).await.unwrap();
    cache.del(&key).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn p_expire_shortens_lifetime() {
    let cache = connected(MemoryCacheConfig::default()).await;
    let key = CacheKey::from("session");
    cache.set(&key, json!("s"), SetOptions::default()).await.unwrap();
    cache
        .p_expire(&key, Duration::from_millis(30))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(cache.get(&key).await.unwrap(), None);

    cache.set(&key, json!("s"), SetOptions::default()).await.unwrap();
    cache.p_expire(&key, Duration::ZERO).await.unwrap();
    assert!(!cache.has(&key).await.unwrap());
}

#[tokio::test]
async fn m_set_and_m_get() {
    let cache = connected(MemoryCacheConfig::default()).await;
    cache
        .m_set(vec![
            CacheEntry::new("a", json!(1)),
            CacheEntry::new("b", json!(2)).with_ttl(Duration::from_millis(30)),
            CacheEntry::new(3, json!(3)),
        ])
        .await
        .unwrap();

    let keys = [
        CacheKey::from("a"),
        CacheKey::from("b"),
        CacheKey::from(3),
        CacheKey::from("missing"),
    ];
    let found = cache.m_get(&keys).await.unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found["3"], json!(3));

    tokio::time::sleep(Duration::from_millis(60)).await;
    let found = cache.m_get(&keys).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(!found.contains_key("b"));
}

#[tokio::test]
async fn concurrent_writers_share_one_store() {
    let cache = std::sync::Arc::new(connected(MemoryCacheConfig::default()).await);
    let mut handles = Vec::new();
    for i in 0..16i64 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            cache
                .set(&CacheKey::from(i), json!(i * 10), SetOptions::default())
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    for i in 0..16i64 {
        assert_eq!(
            cache.get(&CacheKey::from(i)).await.unwrap(),
            Some(json!(i * 10))
        );
    }
}

#[tokio::test]
async fn unbounded_ttl_never_expires() {
    let cache = connected(MemoryCacheConfig::default()).await;
    let key = CacheKey::from("far");
    cache
        .set(&key, json!(1), SetOptions::ttl(Duration::MAX))
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(json!(1)));

    cache.p_expire(&key, Duration::MAX).await.unwrap();
    assert!(cache.has(&key).await.unwrap());

    cache
        .m_set(vec![CacheEntry::new("far-batch", json!(2)).with_ttl(Duration::MAX)])
        .await
        .unwrap();
    assert!(cache.has(&CacheKey::from("far-batch")).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn key_limit_holds_under_concurrent_writers() {
    let cache = std::sync::Arc::new(
        connected(MemoryCacheConfig {
            max_keys: Some(1),
            ..Default::default()
        })
        .await,
    );
    let mut handles = Vec::new();
    for i in 0..32i64 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            cache
                .set(&CacheKey::from(i), json!(i), SetOptions::default())
                .await
        }));
    }
    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(err) => assert!(matches!(err, CacheError::WriteRejected { .. })),
        }
    }
    assert_eq!(accepted, 1);

    let keys: Vec<CacheKey> = (0..32i64).map(CacheKey::from).collect();
    assert_eq!(cache.m_get(&keys).await.unwrap().len(), 1);
}
