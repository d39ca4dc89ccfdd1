use domain::{ObjectId, now_epoch_ms};
use presence_storage::{InMemoryPresenceStore, PresenceStore};
use std::sync::Arc;
use std::time::Duration;

const TTL: Duration = Duration::from_secs(30);

#[tokio::test]
async fn upsert_creates_then_advances() {
    let store = InMemoryPresenceStore::new();
    store.upsert(ObjectId(1), 1000).await.expect("insert");
    store.upsert(ObjectId(1), 2000).await.expect("update");

    let records = store.list().await.expect("list");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].object_id, ObjectId(1));
    assert_eq!(records[0].last_seen_at_ms, 2000);
}

#[tokio::test]
async fn upsert_same_timestamp_is_idempotent() {
    let store = InMemoryPresenceStore::new();
    store.upsert(ObjectId(9), 1500).await.expect("first");
    store.upsert(ObjectId(9), 1500).await.expect("second");

    assert_eq!(store.len(), 1);
    let record = store.get(ObjectId(9)).await.expect("get").expect("record");
    assert_eq!(record.last_seen_at_ms, 1500);
}

#[tokio::test]
async fn older_observation_never_wins() {
    let store = InMemoryPresenceStore::new();
    store.upsert(ObjectId(5), 2000).await.expect("later first");
    store.upsert(ObjectId(5), 1000).await.expect("earlier second");

    let record = store.get(ObjectId(5)).await.expect("get").expect("record");
    assert_eq!(record.last_seen_at_ms, 2000);
}

#[tokio::test]
async fn get_missing_returns_none() {
    let store = InMemoryPresenceStore::new();
    assert!(store.get(ObjectId(404)).await.expect("get").is_none());
}

#[tokio::test]
async fn expiry_boundary_is_inclusive() {
    let store = InMemoryPresenceStore::new();
    let now = 1_000_000;
    store.upsert(ObjectId(1), now - 30_000).await.expect("exactly ttl");
    store.upsert(ObjectId(2), now - 29_999).await.expect("just inside");
    store.upsert(ObjectId(3), now - 45_000).await.expect("well past");

    let removed = store.expire_older_than_at(now, TTL).expect("expire");
    assert_eq!(removed, 2);
    assert!(store.get(ObjectId(1)).await.expect("get").is_none());
    assert!(store.get(ObjectId(2)).await.expect("get").is_some());
    assert!(store.get(ObjectId(3)).await.expect("get").is_none());
}

#[tokio::test]
async fn expire_on_empty_store_is_noop() {
    let store = InMemoryPresenceStore::new();
    assert_eq!(store.expire_older_than(TTL).await.expect("expire"), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn stale_record_is_swept() {
    let store = InMemoryPresenceStore::new();
    store
        .upsert(ObjectId(55), now_epoch_ms() - 31_000)
        .await
        .expect("upsert");

    let removed = store.expire_older_than(TTL).await.expect("expire");
    assert_eq!(removed, 1);
    assert!(store.get(ObjectId(55)).await.expect("get").is_none());
}

#[tokio::test]
async fn refreshed_record_survives_sweep() {
    let store = InMemoryPresenceStore::new();
    let t = 1_000_000;
    store.upsert(ObjectId(77), t).await.expect("first");
    store.upsert(ObjectId(77), t + 5_000).await.expect("refresh");

    let removed = store.expire_older_than_at(t + 10_000, TTL).expect("expire");
    assert_eq!(removed, 0);
    let record = store.get(ObjectId(77)).await.expect("get").expect("record");
    assert_eq!(record.last_seen_at_ms, t + 5_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_upserts_converge_to_latest() {
    let store = Arc::new(InMemoryPresenceStore::new());
    let mut handles = Vec::new();
    for ts in (1..=200_i64).rev() {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.upsert(ObjectId(42), ts).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("upsert");
    }

    let record = store.get(ObjectId(42)).await.expect("get").expect("record");
    assert_eq!(record.last_seen_at_ms, 200);
    assert_eq!(store.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sweep_never_deletes_fresh_concurrent_writes() {
    let store = Arc::new(InMemoryPresenceStore::new());
    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                store
                    .upsert(ObjectId(7), now_epoch_ms())
                    .await
                    .expect("upsert");
                tokio::task::yield_now().await;
            }
        })
    };
    for _ in 0..500 {
        store.expire_older_than(TTL).await.expect("expire");
        tokio::task::yield_now().await;
    }
    writer.await.expect("join");

    assert!(store.get(ObjectId(7)).await.expect("get").is_some());
}
