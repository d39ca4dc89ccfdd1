//! 在线记录查询 handlers
//!
//! - GET /presence
//! - GET /presence/{object_id}

use crate::AppState;
use crate::utils::response::{not_found_error, presence_to_dto, storage_error};
use api_contract::{ApiResponse, PresenceDto};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::ObjectId;

pub async fn list_presence(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(records) => {
            let data: Vec<PresenceDto> = records.into_iter().map(presence_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

pub async fn get_presence(State(state): State<AppState>, Path(object_id): Path<i64>) -> Response {
    match state.store.get(ObjectId(object_id)).await {
        Ok(Some(record)) => {
            (StatusCode::OK, Json(ApiResponse::success(presence_to_dto(record)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
