//! 在线追踪服务：接收 /callback 批次、并发查询对象状态、维护带 TTL 的最后在线记录。

mod handlers;
mod middleware;
mod routes;
mod utils;

use presence_config::{AppConfig, ConfigError, StoreBackend};
use presence_ingest::BatchIngestor;
use presence_oracle::{HttpOracleConfig, HttpStatusOracle};
use presence_poller::{Poller, PollerConfig};
use presence_storage::{InMemoryPresenceStore, PgPresenceStore, PresenceStore};
use presence_sweeper::{Sweeper, SweeperConfig};
use presence_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub ingestor: BatchIngestor,
    pub store: Arc<dyn PresenceStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 进程内唯一的在线记录存储，批次接入与过期清理共用
    let store: Arc<dyn PresenceStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ConfigError::Missing("PRESENCE_DATABASE_URL".to_string()))?;
            let store = PgPresenceStore::connect(database_url, config.db_max_connections).await?;
            store.ensure_schema().await?;
            info!("presence store: postgres");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("presence store: memory (PRESENCE_STORE=memory)");
            Arc::new(InMemoryPresenceStore::new())
        }
    };

    let oracle = HttpStatusOracle::new(HttpOracleConfig {
        base_url: config.oracle_url.clone(),
        timeout: config.oracle_timeout(),
    })?;
    info!(
        "status oracle: {} (max concurrency {})",
        oracle.base_url(),
        config.poll_max_concurrency
    );
    let poller = Poller::new(
        Arc::new(oracle),
        PollerConfig {
            max_concurrency: config.poll_max_concurrency,
            lookup_timeout: config.oracle_timeout(),
        },
    );
    let ingestor = BatchIngestor::new(poller, store.clone());

    // 过期清理后台任务
    let sweeper = Sweeper::new(
        store.clone(),
        SweeperConfig {
            interval: config.sweep_interval(),
            ttl: config.presence_ttl(),
        },
    )
    .spawn();

    let app = routes::create_app(AppState { ingestor, store });
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("listening on {}", config.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
