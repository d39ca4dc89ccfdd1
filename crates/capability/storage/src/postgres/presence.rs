//! Postgres 在线记录实现

use crate::error::StorageError;
use crate::presence::{PresenceStore, ttl_ms};
use domain::{ObjectId, PresenceRecord};
use sqlx::{PgPool, Row};
use std::time::Duration;

/// interval 运算可接受的 TTL 上限（100 年），更大的 TTL 等价于永不过期。
const MAX_INTERVAL_TTL_MS: i64 = 100 * 365 * 24 * 60 * 60 * 1000;

fn interval_ttl_ms(ttl: Duration) -> i64 {
    ttl_ms(ttl).min(MAX_INTERVAL_TTL_MS)
}

pub struct PgPresenceStore {
    pub pool: PgPool,
}

impl PgPresenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url, max_connections).await?;
        Ok(Self { pool })
    }

    /// 创建 presence 表（已存在则跳过）。
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            "create table if not exists presence ( \
                 object_id bigint primary key, \
                 last_seen timestamptz not null \
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<PresenceRecord, StorageError> {
    Ok(PresenceRecord {
        object_id: ObjectId(row.try_get("object_id")?),
        last_seen_at_ms: row.try_get("last_seen_at_ms")?,
    })
}

#[async_trait::async_trait]
impl PresenceStore for PgPresenceStore {
    async fn upsert(&self, object_id: ObjectId, seen_at_ms: i64) -> Result<(), StorageError> {
        sqlx::query(
            "insert into presence (object_id, last_seen) \
             values ($1, to_timestamp($2 / 1000.0)) \
             on conflict (object_id) do update \
             set last_seen = greatest(presence.last_seen, excluded.last_seen)",
        )
        .bind(object_id.get())
        .bind(seen_at_ms as f64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn expire_older_than(&self, ttl: Duration) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "delete from presence \
             where last_seen <= now() - ($1::bigint * interval '1 millisecond')",
        )
        .bind(interval_ttl_ms(ttl))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn get(&self, object_id: ObjectId) -> Result<Option<PresenceRecord>, StorageError> {
        let row = sqlx::query(
            "select object_id, (extract(epoch from last_seen) * 1000)::bigint as last_seen_at_ms \
             from presence where object_id = $1",
        )
        .bind(object_id.get())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<PresenceRecord>, StorageError> {
        let rows = sqlx::query(
            "select object_id, (extract(epoch from last_seen) * 1000)::bigint as last_seen_at_ms \
             from presence order by object_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(record_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_bounded_for_interval_math() {
        assert_eq!(interval_ttl_ms(Duration::from_secs(30)), 30_000);
        assert_eq!(interval_ttl_ms(Duration::MAX), MAX_INTERVAL_TTL_MS);
        assert_eq!(
            interval_ttl_ms(Duration::from_secs(u64::MAX / 1000)),
            MAX_INTERVAL_TTL_MS
        );
    }
}
