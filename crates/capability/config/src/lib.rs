//! 应用运行配置加载。

use std::env;
use std::time::Duration;

/// TTL 上限（100 年），超出后 Postgres interval 运算会溢出。
pub const MAX_PRESENCE_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 在线记录存储后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub oracle_url: String,
    pub oracle_timeout_ms: u64,
    pub poll_max_concurrency: usize,
    pub sweep_interval_ms: u64,
    pub presence_ttl_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("PRESENCE_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:9090".to_string());
        let store_backend = read_store_backend("PRESENCE_STORE")?;
        let database_url = read_optional("PRESENCE_DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("PRESENCE_DATABASE_URL".to_string()));
        }
        let db_max_connections = read_u32_with_default("PRESENCE_DB_MAX_CONNECTIONS", 8)?.max(1);
        let oracle_url = env::var("PRESENCE_ORACLE_URL")
            .unwrap_or_else(|_| "http://localhost:9010".to_string())
            .trim_end_matches('/')
            .to_string();
        let oracle_timeout_ms = read_u64_with_default("PRESENCE_ORACLE_TIMEOUT_MS", 5000)?.max(1);
        let poll_max_concurrency =
            read_u64_with_default("PRESENCE_POLL_MAX_CONCURRENCY", 256)?.max(1) as usize;
        let sweep_interval_ms = read_u64_with_default("PRESENCE_SWEEP_INTERVAL_MS", 1000)?.max(1);
        let presence_ttl_seconds = read_u64_with_default("PRESENCE_TTL_SECONDS", 30)?;
        if presence_ttl_seconds > MAX_PRESENCE_TTL_SECONDS {
            return Err(ConfigError::Invalid(
                "PRESENCE_TTL_SECONDS".to_string(),
                presence_ttl_seconds.to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            store_backend,
            database_url,
            db_max_connections,
            oracle_url,
            oracle_timeout_ms,
            poll_max_concurrency,
            sweep_interval_ms,
            presence_ttl_seconds,
        })
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn presence_ttl(&self) -> Duration {
        Duration::from_secs(self.presence_ttl_seconds)
    }
}

fn read_store_backend(key: &str) -> Result<StoreBackend, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(StoreBackend::Postgres),
    };
    match value.to_ascii_lowercase().as_str() {
        "postgres" | "pg" => Ok(StoreBackend::Postgres),
        "memory" | "in-memory" => Ok(StoreBackend::Memory),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
