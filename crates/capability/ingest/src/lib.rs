//! 批次接入
//!
//! 收到一个回调批次后：
//!
//! 1. 记录一次接收时间，整个批次共用（不按对象单独取时间）
//! 2. 解码 `{"object_ids": [...]}`，结构不合法时返回 [`IngestError::Decode`]
//! 3. 通过 [`Poller`] 并发查询所有对象
//! 4. 对在线的对象调用 `PresenceStore::upsert(id, 接收时间)`
//!
//! 离线、查询失败的对象直接丢弃；单个对象写入失败只记录日志与计数，不影响同批其它对象。
//! 解码失败是唯一对外可见的错误。
//!
//! 解码之后的轮询与写入在独立的 tokio 任务中执行，调用方 future 被丢弃（客户端断开、
//! 请求超时）时批次仍会处理完毕。

use api_contract::CallbackRequest;
use domain::{Batch, ObjectId, now_epoch_ms};
use presence_poller::Poller;
use presence_storage::PresenceStore;
use presence_telemetry::{
    record_batch_received, record_batch_rejected, record_reports, record_upsert_failed,
    record_upsert_ok,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("decode error: {0}")]
    Decode(String),
    /// 批次处理任务异常退出（panic 或运行时关闭）。
    #[error("batch task failed: {0}")]
    Task(String),
}

/// 单个批次的处理结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub received: usize,
    pub online: usize,
    pub offline: usize,
    pub written: usize,
    pub write_failures: usize,
    pub observed_at_ms: i64,
}

/// 解码回调请求体。
pub fn decode_batch(payload: &[u8], received_at_ms: i64) -> Result<Batch, IngestError> {
    let request: CallbackRequest =
        serde_json::from_slice(payload).map_err(|err| IngestError::Decode(err.to_string()))?;
    let object_ids = request.object_ids.into_iter().map(ObjectId).collect();
    Ok(Batch::new(object_ids, received_at_ms))
}

/// 批次接入处理器。
#[derive(Clone)]
pub struct BatchIngestor {
    poller: Poller,
    store: Arc<dyn PresenceStore>,
}

impl BatchIngestor {
    pub fn new(poller: Poller, store: Arc<dyn PresenceStore>) -> Self {
        Self { poller, store }
    }

    /// 解码并处理一个原始请求体。
    ///
    /// 解码在当前 future 内完成；批次处理交给 [`BatchIngestor::spawn`]，
    /// 丢弃本 future 只会放弃等待结果，不会取消批次。
    pub async fn ingest_payload(&self, payload: &[u8]) -> Result<IngestSummary, IngestError> {
        // 收到请求的时刻即为本批次对象的最后在线时间
        let received_at_ms = now_epoch_ms();
        let batch = match decode_batch(payload, received_at_ms) {
            Ok(batch) => batch,
            Err(err) => {
                record_batch_rejected();
                warn!(
                    target: "presence.ingest",
                    payload_size = payload.len(),
                    error = %err,
                    "batch_rejected"
                );
                return Err(err);
            }
        };
        self.spawn(batch)
            .await
            .map_err(|err| IngestError::Task(err.to_string()))
    }

    /// 在独立任务中处理批次，返回的句柄被丢弃时任务继续运行。
    pub fn spawn(&self, batch: Batch) -> JoinHandle<IngestSummary> {
        let ingestor = self.clone();
        tokio::spawn(async move { ingestor.ingest(batch).await })
    }

    /// 处理一个已解码的批次。
    pub async fn ingest(&self, batch: Batch) -> IngestSummary {
        record_batch_received();
        info!(
            target: "presence.ingest",
            size = batch.len(),
            received_at_ms = batch.received_at_ms,
            "batch_received"
        );

        let reports = self.poller.poll_all(&batch.object_ids).await;
        let online: Vec<ObjectId> = reports
            .iter()
            .filter(|report| report.online)
            .map(|report| report.object_id)
            .collect();
        let offline = reports.len() - online.len();
        record_reports(online.len() as u64, offline as u64);

        let mut written = 0;
        let mut write_failures = 0;
        for object_id in &online {
            match self.store.upsert(*object_id, batch.received_at_ms).await {
                Ok(()) => {
                    record_upsert_ok();
                    written += 1;
                }
                Err(err) => {
                    record_upsert_failed();
                    write_failures += 1;
                    warn!(
                        target: "presence.ingest",
                        object_id = %object_id,
                        error = %err,
                        "presence_upsert_failed"
                    );
                }
            }
        }

        let summary = IngestSummary {
            received: batch.len(),
            online: online.len(),
            offline,
            written,
            write_failures,
            observed_at_ms: batch.received_at_ms,
        };
        info!(
            target: "presence.ingest",
            received = summary.received,
            online = summary.online,
            offline = summary.offline,
            written = summary.written,
            write_failures = summary.write_failures,
            "batch_processed"
        );
        summary
    }
}
