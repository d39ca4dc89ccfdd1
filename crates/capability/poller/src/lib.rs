//! 并发轮询扇出
//!
//! 一个批次内每个对象启动一个查询任务，全部完成（或失败）后才返回。
//! 状态服务单次查询耗时从几百毫秒到数秒不等，而批次按固定短周期到达，
//! 串行查询会错过下一个批次，因此并发度等于批次大小，同时受全局上限约束。
//!
//! - 结果顺序不保证与输入一致
//! - 单个对象查询失败、超时或任务异常都按离线处理，不影响其它对象
//! - 输入 K 个对象，输出恰好 K 条报告

use domain::{ObjectId, StatusReport};
use presence_oracle::{OracleError, StatusOracle};
use presence_telemetry::{record_lookup_failed, record_lookup_ok, record_poll_latency_ms};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// 轮询参数。
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// 全进程同时在途的查询上限（所有批次共享）
    pub max_concurrency: usize,
    /// 单次查询超时，超时按失败处理
    pub lookup_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 256,
            lookup_timeout: Duration::from_secs(5),
        }
    }
}

/// 轮询扇出引擎。
#[derive(Clone)]
pub struct Poller {
    oracle: Arc<dyn StatusOracle>,
    limiter: Arc<Semaphore>,
    lookup_timeout: Duration,
}

impl Poller {
    pub fn new(oracle: Arc<dyn StatusOracle>, config: PollerConfig) -> Self {
        let max_concurrency = config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
        Self {
            oracle,
            limiter: Arc::new(Semaphore::new(max_concurrency)),
            lookup_timeout: config.lookup_timeout,
        }
    }

    /// 并发查询全部对象，返回每个对象一条报告。
    pub async fn poll_all(&self, object_ids: &[ObjectId]) -> Vec<StatusReport> {
        if object_ids.is_empty() {
            return Vec::new();
        }
        let started_at = Instant::now();

        let mut tasks = JoinSet::new();
        for &object_id in object_ids {
            let oracle = self.oracle.clone();
            let limiter = self.limiter.clone();
            let lookup_timeout = self.lookup_timeout;
            tasks.spawn(async move {
                let outcome = match limiter.acquire_owned().await {
                    Ok(_permit) => lookup_with_timeout(oracle.as_ref(), object_id, lookup_timeout).await,
                    Err(_) => Err(OracleError::Unavailable("poller closed".to_string())),
                };
                (object_id, outcome)
            });
        }

        // 记录尚未产出报告的对象（同一对象可能在批次中重复出现）
        let mut pending: HashMap<ObjectId, usize> = HashMap::new();
        for &object_id in object_ids {
            *pending.entry(object_id).or_insert(0) += 1;
        }

        let mut reports = Vec::with_capacity(object_ids.len());
        let mut failed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((object_id, Ok(report))) => {
                    record_lookup_ok();
                    settle(&mut pending, object_id);
                    reports.push(StatusReport {
                        object_id,
                        online: report.online,
                    });
                }
                Ok((object_id, Err(err))) => {
                    record_lookup_failed();
                    failed += 1;
                    warn!(
                        target: "presence.poller",
                        object_id = %object_id,
                        error = %err,
                        "lookup_failed"
                    );
                    settle(&mut pending, object_id);
                    reports.push(StatusReport::offline(object_id));
                }
                Err(err) => {
                    // 任务 panic 时拿不到对象 ID，循环结束后按 pending 补齐
                    record_lookup_failed();
                    failed += 1;
                    warn!(target: "presence.poller", error = %err, "lookup_task_failed");
                }
            }
        }
        for (object_id, count) in pending {
            reports.extend(std::iter::repeat_n(StatusReport::offline(object_id), count));
        }

        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        record_poll_latency_ms(elapsed_ms);
        info!(
            target: "presence.poller",
            polled = reports.len(),
            failed = failed,
            elapsed_ms = elapsed_ms,
            "poll_completed"
        );
        reports
    }
}

async fn lookup_with_timeout(
    oracle: &dyn StatusOracle,
    object_id: ObjectId,
    lookup_timeout: Duration,
) -> Result<StatusReport, OracleError> {
    match tokio::time::timeout(lookup_timeout, oracle.lookup(object_id)).await {
        Ok(result) => result,
        Err(_) => Err(OracleError::Unavailable(format!(
            "lookup timed out after {}ms",
            lookup_timeout.as_millis()
        ))),
    }
}

fn settle(pending: &mut HashMap<ObjectId, usize>, object_id: ObjectId) {
    if let Some(count) = pending.get_mut(&object_id) {
        *count -= 1;
        if *count == 0 {
            pending.remove(&object_id);
        }
    }
}
