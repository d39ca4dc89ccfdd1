//! 批次回调 handler
//!
//! - POST /callback  `{"object_ids": [101, 102, 103]}`
//!
//! 请求体结构不合法时返回 400；其余情况（包括部分对象查询或写入失败）均返回 200 与处理摘要。
//! 客户端中途断开时批次仍在后台任务中处理完毕。

use crate::AppState;
use crate::utils::response::{bad_request_error, internal_error, summary_to_dto};
use api_contract::ApiResponse;
use presence_ingest::IngestError;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn callback(State(state): State<AppState>, body: Bytes) -> Response {
    match state.ingestor.ingest_payload(&body).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(ApiResponse::success(summary_to_dto(summary))),
        )
            .into_response(),
        Err(err @ IngestError::Decode(_)) => bad_request_error(err.to_string()),
        Err(err @ IngestError::Task(_)) => internal_error(err.to_string()),
    }
}
