//! 在线记录存储接口。
//!
//! 写入方只调用 `upsert`，删除只由清理循环通过 `expire_older_than` 完成。

use crate::error::StorageError;
use domain::{ObjectId, PresenceRecord};
use std::time::Duration;

#[async_trait::async_trait]
pub trait PresenceStore: Send + Sync {
    /// 不存在则创建，存在则推进 `last_seen`。
    ///
    /// 对同一对象原子执行；`last_seen` 只进不退，较晚的观测时间总是胜出。
    async fn upsert(&self, object_id: ObjectId, seen_at_ms: i64) -> Result<(), StorageError>;

    /// 原子删除所有满足 `now - last_seen >= ttl` 的记录，返回删除条数。
    async fn expire_older_than(&self, ttl: Duration) -> Result<u64, StorageError>;

    async fn get(&self, object_id: ObjectId) -> Result<Option<PresenceRecord>, StorageError>;

    /// 按对象 ID 升序列出全部记录。
    async fn list(&self) -> Result<Vec<PresenceRecord>, StorageError>;
}

/// TTL 换算为毫秒（溢出时饱和）。
pub(crate) fn ttl_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}
