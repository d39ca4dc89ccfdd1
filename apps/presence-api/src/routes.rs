//! 路由定义
//!
//! - 健康检查：/health
//! - 批次回调：/callback
//! - 在线记录：/presence, /presence/{object_id}
//! - 指标：/metrics

use super::AppState;
use super::handlers::*;
use crate::middleware::request_context;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// 创建 API 路由
///
/// 同时挂载在 / 与 /api/ 两种前缀下
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/callback", post(callback))
        .route("/presence", get(list_presence))
        .route("/presence/:object_id", get(get_presence))
        .route("/metrics", get(get_metrics))
}

/// 装配完整应用：路由 + 状态 + 中间件
pub fn create_app(state: AppState) -> Router {
    let api = create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::create_app;
    use crate::AppState;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use domain::{ObjectId, StatusReport};
    use http_body_util::BodyExt;
    use presence_ingest::BatchIngestor;
    use presence_oracle::{OracleError, StatusOracle};
    use presence_poller::{Poller, PollerConfig};
    use presence_storage::InMemoryPresenceStore;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// 101 在线，102 离线，103 查询失败。
    struct ScenarioOracle;

    #[async_trait]
    impl StatusOracle for ScenarioOracle {
        async fn lookup(&self, object_id: ObjectId) -> Result<StatusReport, OracleError> {
            match object_id.get() {
                101 => Ok(StatusReport::online(object_id)),
                103 => Err(OracleError::Unavailable("connection refused".to_string())),
                _ => Ok(StatusReport::offline(object_id)),
            }
        }
    }

    fn app() -> Router {
        let store = Arc::new(InMemoryPresenceStore::new());
        let poller = Poller::new(Arc::new(ScenarioOracle), PollerConfig::default());
        let ingestor = BatchIngestor::new(poller, store.clone());
        create_app(AppState { ingestor, store })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    fn post_callback(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/callback")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn callback_records_only_online_ids() {
        let app = app();

        let (status, body) = send(&app, post_callback(r#"{"object_ids":[101,102,103]}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["received"], 3);
        assert_eq!(body["data"]["written"], 1);
        let observed_at_ms = body["data"]["observedAtMs"].as_i64().expect("ts");

        let (status, body) = send(&app, get("/presence/101")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["lastSeenAtMs"].as_i64(), Some(observed_at_ms));

        let (status, body) = send(&app, get("/presence/102")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");

        let (status, body) = send(&app, get("/api/presence")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn malformed_callback_is_bad_request() {
        let app = app();

        let (status, body) = send(&app, post_callback(r#"{"object_ids":[1,"x"]}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID.REQUEST");

        let (_, body) = send(&app, get("/presence")).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn responses_carry_request_ids() {
        let response = app().oneshot(get("/health")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-trace-id"));
    }
}
