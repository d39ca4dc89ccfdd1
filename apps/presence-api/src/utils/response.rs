//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, storage_error, internal_error
//! - DTO 转换：summary_to_dto, presence_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应。

use api_contract::{ApiResponse, IngestSummaryDto, PresenceDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::PresenceRecord;
use presence_ingest::IngestSummary;
use presence_storage::StorageError;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    internal_error(err.to_string())
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message.into())),
    )
        .into_response()
}

/// IngestSummary 转 IngestSummaryDto
pub fn summary_to_dto(summary: IngestSummary) -> IngestSummaryDto {
    IngestSummaryDto {
        received: summary.received,
        online: summary.online,
        offline: summary.offline,
        written: summary.written,
        write_failures: summary.write_failures,
        observed_at_ms: summary.observed_at_ms,
    }
}

/// PresenceRecord 转 PresenceDto
pub fn presence_to_dto(record: PresenceRecord) -> PresenceDto {
    PresenceDto {
        object_id: record.object_id.get(),
        last_seen_at_ms: record.last_seen_at_ms,
    }
}
