use serde_json::json;
use starter_infra::cache::MemoryCacheService;
use starter_infra::{Cache, LoggerService};
use starter_types::domain::cache::{CacheEntry, CacheKey, SetOptions};
use starter_types::ports::cache::CacheError;

async fn memory_handle() -> Cache {
    let cache = Cache::from(MemoryCacheService::new(LoggerService::new("variants")));
    cache.connect().await.unwrap();
    cache
}

#[tokio::test]
async fn memory_handle_rejects_hash_operations() {
    let cache = memory_handle().await;
    let key = CacheKey::from("h");

    let expect = |op: &'static str| CacheError::NotImplemented {
        store: "MemoryCacheService",
        operation: op,
    };
    assert_eq!(cache.h_get(&key, "f").await.unwrap_err(), expect("hGet"));
    assert_eq!(
        cache.h_set(&key, "f", json!(1)).await.unwrap_err(),
        expect("hSet")
    );
    assert_eq!(cache.h_get_all(&key).await.unwrap_err(), expect("hGetAll"));
    assert_eq!(
        cache
            .set_multi(vec![(key.clone(), json!(1))])
            .await
            .unwrap_err(),
        expect("setMulti")
    );

    // Nothing was written as a side effect.
    assert_eq!(cache.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn memory_handle_supports_shared_and_batch_operations() {
    let cache = memory_handle().await;
    assert_eq!(cache.store_name(), "MemoryCacheService");
    cache.is_connected().await.unwrap();

    let key = CacheKey::from("k");
    cache
        .set(&key, json!({ "v": 1 }), SetOptions::default())
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Some(json!({ "v": 1 })));
    assert!(cache.has(&key).await.unwrap());

    cache
        .m_set(vec![CacheEntry::new("x", json!("y"))])
        .await
        .unwrap();
    let found = cache.m_get(&[CacheKey::from("x")]).await.unwrap();
    assert_eq!(found["x"], json!("y"));

    cache.del(&key).await.unwrap();
    assert!(!cache.has(&key).await.unwrap());
}

#[tokio::test]
async fn handle_clones_share_state() {
    let cache = memory_handle().await;
    let other = cache.clone();
    let key = CacheKey::from("shared");
    cache.set(&key, json!(1), SetOptions::default()).await.unwrap();
    assert_eq!(other.get(&key).await.unwrap(), Some(json!(1)));
}
