//! # PostgreSQL 存储实现模块
//!
//! ## 数据库模式要求
//!
//! ```sql
//! create table if not exists presence (
//!     object_id bigint primary key,
//!     last_seen timestamptz not null
//! );
//! ```
//!
//! `object_id` 为主键，保证每个对象最多一条记录。启动时由
//! [`PgPresenceStore::ensure_schema`] 自动创建。
//!
//! ## 原子性
//!
//! - upsert 使用 `insert ... on conflict do update`，单条语句完成存在性判断与写入
//! - 过期删除使用单条 `delete ... where last_seen <= now() - ttl`，判定与删除在同一语句内，
//!   并发 upsert 已推进的行会在重新求值 where 条件后保留
//! - 过期判定使用数据库时钟 `now()`

pub mod presence;

pub use presence::PgPresenceStore;
