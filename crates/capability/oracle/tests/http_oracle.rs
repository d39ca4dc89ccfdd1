use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use domain::{ObjectId, StatusReport};
use presence_oracle::{HttpOracleConfig, HttpStatusOracle, OracleError, StatusOracle};
use std::time::Duration;

async fn object_status(Path(id): Path<i64>) -> Response {
    match id {
        2 => (StatusCode::OK, "not json").into_response(),
        3 => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        4 => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(serde_json::json!({ "id": id, "online": true })).into_response()
        }
        _ => Json(serde_json::json!({ "id": id, "online": id % 2 == 1 })).into_response(),
    }
}

async fn spawn_oracle() -> String {
    let app = Router::new().route("/objects/:id", get(object_status));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

fn client(base_url: String) -> HttpStatusOracle {
    HttpStatusOracle::new(HttpOracleConfig {
        base_url,
        timeout: Duration::from_millis(300),
    })
    .expect("client")
}

#[tokio::test]
async fn lookup_reports_online_and_offline() {
    let oracle = client(spawn_oracle().await);
    assert_eq!(
        oracle.lookup(ObjectId(101)).await.expect("online"),
        StatusReport::online(ObjectId(101))
    );
    assert_eq!(
        oracle.lookup(ObjectId(102)).await.expect("offline"),
        StatusReport::offline(ObjectId(102))
    );
}

#[tokio::test]
async fn lookup_classifies_failures() {
    let oracle = client(spawn_oracle().await);
    assert!(matches!(
        oracle.lookup(ObjectId(2)).await,
        Err(OracleError::MalformedResponse(_))
    ));
    assert!(matches!(
        oracle.lookup(ObjectId(3)).await,
        Err(OracleError::Unavailable(_))
    ));
}

#[tokio::test]
async fn hung_lookup_times_out_as_unavailable() {
    let oracle = client(spawn_oracle().await);
    let started = std::time::Instant::now();
    let result = oracle.lookup(ObjectId(4)).await;
    assert!(matches!(result, Err(OracleError::Unavailable(_))));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unreachable_oracle_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let oracle = client(format!("http://{}", addr));
    assert!(matches!(
        oracle.lookup(ObjectId(1)).await,
        Err(OracleError::Unavailable(_))
    ));
}
