//! 过期清理
//!
//! 后台循环，每个节拍调用一次 `PresenceStore::expire_older_than(ttl)`。
//! 只有一个运行状态，随进程存活；某次清理失败只记录日志，下一个节拍重试。

use presence_storage::{PresenceStore, StorageError};
use presence_telemetry::{record_records_expired, record_sweep_failure};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// 清理错误。
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("store error: {0}")]
    Store(#[from] StorageError),
}

/// 清理参数。
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// 清理节拍
    pub interval: Duration,
    /// 记录存活时间
    pub ttl: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            ttl: Duration::from_secs(30),
        }
    }
}

/// 过期清理器。
pub struct Sweeper {
    store: Arc<dyn PresenceStore>,
    config: SweeperConfig,
}

impl Sweeper {
    pub fn new(store: Arc<dyn PresenceStore>, config: SweeperConfig) -> Self {
        Self { store, config }
    }

    /// 执行一次清理，返回删除条数。
    pub async fn sweep_once(&self) -> Result<u64, SweepError> {
        let expired = self.store.expire_older_than(self.config.ttl).await?;
        record_records_expired(expired);
        Ok(expired)
    }

    /// 按节拍持续清理，不会因单次失败退出。
    pub async fn run(self) {
        info!(
            target: "presence.sweeper",
            interval_ms = self.config.interval.as_millis() as u64,
            ttl_seconds = self.config.ttl.as_secs(),
            "sweeper_started"
        );
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(0) => debug!(target: "presence.sweeper", "sweep_idle"),
                Ok(expired) => info!(target: "presence.sweeper", expired = expired, "sweep_expired"),
                Err(err) => {
                    record_sweep_failure();
                    warn!(target: "presence.sweeper", error = %err, "sweep_failed");
                }
            }
        }
    }

    /// 在后台任务中运行清理循环。
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
