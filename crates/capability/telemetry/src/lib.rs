//! 追踪、请求 ID 生成与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 进程级计数器。
pub struct TelemetryMetrics {
    batches_received: AtomicU64,
    batches_rejected: AtomicU64,
    lookups_ok: AtomicU64,
    lookups_failed: AtomicU64,
    reports_online: AtomicU64,
    reports_offline: AtomicU64,
    upserts_ok: AtomicU64,
    upserts_failed: AtomicU64,
    records_expired: AtomicU64,
    sweep_failures: AtomicU64,
    poll_latency_ms_total: AtomicU64,
    poll_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            batches_received: AtomicU64::new(0),
            batches_rejected: AtomicU64::new(0),
            lookups_ok: AtomicU64::new(0),
            lookups_failed: AtomicU64::new(0),
            reports_online: AtomicU64::new(0),
            reports_offline: AtomicU64::new(0),
            upserts_ok: AtomicU64::new(0),
            upserts_failed: AtomicU64::new(0),
            records_expired: AtomicU64::new(0),
            sweep_failures: AtomicU64::new(0),
            poll_latency_ms_total: AtomicU64::new(0),
            poll_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_received: self.batches_received.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            lookups_ok: self.lookups_ok.load(Ordering::Relaxed),
            lookups_failed: self.lookups_failed.load(Ordering::Relaxed),
            reports_online: self.reports_online.load(Ordering::Relaxed),
            reports_offline: self.reports_offline.load(Ordering::Relaxed),
            upserts_ok: self.upserts_ok.load(Ordering::Relaxed),
            upserts_failed: self.upserts_failed.load(Ordering::Relaxed),
            records_expired: self.records_expired.load(Ordering::Relaxed),
            sweep_failures: self.sweep_failures.load(Ordering::Relaxed),
            poll_latency_ms_total: self.poll_latency_ms_total.load(Ordering::Relaxed),
            poll_latency_ms_count: self.poll_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录收到的批次数。
pub fn record_batch_received() {
    metrics().batches_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录解码失败被拒绝的批次数。
pub fn record_batch_rejected() {
    metrics().batches_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录状态查询成功次数。
pub fn record_lookup_ok() {
    metrics().lookups_ok.fetch_add(1, Ordering::Relaxed);
}

/// 记录状态查询失败次数（含超时）。
pub fn record_lookup_failed() {
    metrics().lookups_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录在线/离线报告数。
pub fn record_reports(online: u64, offline: u64) {
    let metrics = metrics();
    metrics.reports_online.fetch_add(online, Ordering::Relaxed);
    metrics.reports_offline.fetch_add(offline, Ordering::Relaxed);
}

pub fn record_upsert_ok() {
    metrics().upserts_ok.fetch_add(1, Ordering::Relaxed);
}

pub fn record_upsert_failed() {
    metrics().upserts_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录过期删除的记录数。
pub fn record_records_expired(count: u64) {
    metrics().records_expired.fetch_add(count, Ordering::Relaxed);
}

pub fn record_sweep_failure() {
    metrics().sweep_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次批次轮询耗时（毫秒）。
pub fn record_poll_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .poll_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .poll_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
