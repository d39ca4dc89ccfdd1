//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use presence_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            batches_received: snapshot.batches_received,
            batches_rejected: snapshot.batches_rejected,
            lookups_ok: snapshot.lookups_ok,
            lookups_failed: snapshot.lookups_failed,
            reports_online: snapshot.reports_online,
            reports_offline: snapshot.reports_offline,
            upserts_ok: snapshot.upserts_ok,
            upserts_failed: snapshot.upserts_failed,
            records_expired: snapshot.records_expired,
            sweep_failures: snapshot.sweep_failures,
            poll_latency_ms_total: snapshot.poll_latency_ms_total,
            poll_latency_ms_count: snapshot.poll_latency_ms_count,
        })),
    )
        .into_response()
}
