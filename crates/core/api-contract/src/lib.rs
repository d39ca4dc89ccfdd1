//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 回调批次请求体：`{"object_ids": [1, 2, 3]}`。
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    #[serde(alias = "objectIds")]
    pub object_ids: Vec<i64>,
}

/// 状态服务单次查询响应体：`{"id": 1, "online": true}`。
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectStatusDto {
    pub id: i64,
    pub online: bool,
}

/// 批次处理结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummaryDto {
    pub received: usize,
    pub online: usize,
    pub offline: usize,
    pub written: usize,
    pub write_failures: usize,
    pub observed_at_ms: i64,
}

/// 在线记录返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    pub object_id: i64,
    pub last_seen_at_ms: i64,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub batches_received: u64,
    pub batches_rejected: u64,
    pub lookups_ok: u64,
    pub lookups_failed: u64,
    pub reports_online: u64,
    pub reports_offline: u64,
    pub upserts_ok: u64,
    pub upserts_failed: u64,
    pub records_expired: u64,
    pub sweep_failures: u64,
    pub poll_latency_ms_total: u64,
    pub poll_latency_ms_count: u64,
}
