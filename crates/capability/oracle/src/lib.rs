//! 状态服务客户端
//!
//! 每次 `lookup` 对状态服务发起一次 `GET {base_url}/objects/{id}`，响应体为
//! `{"id": 101, "online": true}`。不做重试：单个对象查询失败由调用方按离线处理。

use api_contract::ObjectStatusDto;
use async_trait::async_trait;
use domain::{ObjectId, StatusReport};
use std::time::Duration;
use tracing::debug;

/// 状态查询错误。
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// 请求失败、超时、非 2xx 或响应体读取失败
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    /// 响应体无法解码为 `{id, online}`
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// 状态服务抽象。
#[async_trait]
pub trait StatusOracle: Send + Sync {
    async fn lookup(&self, object_id: ObjectId) -> Result<StatusReport, OracleError>;
}

/// HTTP 状态服务配置。
#[derive(Debug, Clone)]
pub struct HttpOracleConfig {
    /// 例如 `http://localhost:9010`
    pub base_url: String,
    /// 单次请求超时
    pub timeout: Duration,
}

/// 基于 reqwest 的状态服务客户端（内部连接池可在并发任务间共享）。
#[derive(Debug, Clone)]
pub struct HttpStatusOracle {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatusOracle {
    pub fn new(config: HttpOracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| OracleError::Unavailable(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn object_url(&self, object_id: ObjectId) -> String {
        format!("{}/objects/{}", self.base_url, object_id)
    }
}

#[async_trait]
impl StatusOracle for HttpStatusOracle {
    async fn lookup(&self, object_id: ObjectId) -> Result<StatusReport, OracleError> {
        let url = self.object_url(object_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| OracleError::Unavailable(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Unavailable(format!("{} returned {}", url, status)));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| OracleError::Unavailable(err.to_string()))?;
        let report = decode_status(object_id, &body)?;
        debug!(
            target: "presence.oracle",
            object_id = %object_id,
            online = report.online,
            "lookup_ok"
        );
        Ok(report)
    }
}

/// 解码状态服务响应体。
///
/// 响应中的 id 必须与请求的对象一致，否则视为格式错误。
pub fn decode_status(object_id: ObjectId, body: &[u8]) -> Result<StatusReport, OracleError> {
    let dto: ObjectStatusDto = serde_json::from_slice(body)
        .map_err(|err| OracleError::MalformedResponse(err.to_string()))?;
    if dto.id != object_id.get() {
        return Err(OracleError::MalformedResponse(format!(
            "expected id {}, got {}",
            object_id, dto.id
        )));
    }
    Ok(StatusReport {
        object_id,
        online: dto.online,
    })
}
