//! 在线记录内存实现。

use crate::error::StorageError;
use crate::presence::{PresenceStore, ttl_ms};
use domain::{ObjectId, PresenceRecord, now_epoch_ms};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

/// 基于 `RwLock<HashMap>` 的在线记录存储。
///
/// upsert 与过期删除都在写锁内完成，判定与删除之间不会插入并发写。
pub struct InMemoryPresenceStore {
    records: RwLock<HashMap<ObjectId, i64>>,
}

impl InMemoryPresenceStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// 以指定的当前时间执行过期删除。
    pub fn expire_older_than_at(&self, now_ms: i64, ttl: Duration) -> Result<u64, StorageError> {
        let cutoff_ms = now_ms.saturating_sub(ttl_ms(ttl));
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let before = map.len();
        map.retain(|_, last_seen_at_ms| *last_seen_at_ms > cutoff_ms);
        Ok((before - map.len()) as u64)
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPresenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PresenceStore for InMemoryPresenceStore {
    async fn upsert(&self, object_id: ObjectId, seen_at_ms: i64) -> Result<(), StorageError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        map.entry(object_id)
            .and_modify(|last_seen_at_ms| {
                if seen_at_ms > *last_seen_at_ms {
                    *last_seen_at_ms = seen_at_ms;
                }
            })
            .or_insert(seen_at_ms);
        Ok(())
    }

    async fn expire_older_than(&self, ttl: Duration) -> Result<u64, StorageError> {
        self.expire_older_than_at(now_epoch_ms(), ttl)
    }

    async fn get(&self, object_id: ObjectId) -> Result<Option<PresenceRecord>, StorageError> {
        let map = self
            .records
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(&object_id).map(|last_seen_at_ms| PresenceRecord {
            object_id,
            last_seen_at_ms: *last_seen_at_ms,
        }))
    }

    async fn list(&self) -> Result<Vec<PresenceRecord>, StorageError> {
        let map = self
            .records
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<PresenceRecord> = map
            .iter()
            .map(|(object_id, last_seen_at_ms)| PresenceRecord {
                object_id: *object_id,
                last_seen_at_ms: *last_seen_at_ms,
            })
            .collect();
        items.sort_by_key(|item| item.object_id);
        Ok(items)
    }
}
