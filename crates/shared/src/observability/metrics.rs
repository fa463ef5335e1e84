//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集。
//! 指标通过主服务的 `/metrics` 路由暴露，供 Prometheus 抓取。

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::error::{InfraError, Result};

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源句柄
#[derive(Clone)]
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// 渲染 Prometheus 文本格式
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 安装 Prometheus recorder
///
/// 同一进程只能安装一次，重复调用返回已安装的 handle。
pub fn init(service_name: &str) -> Result<MetricsHandle> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(MetricsHandle {
            handle: handle.clone(),
        });
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| InfraError::Observability(e.to_string()))?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    Ok(MetricsHandle { handle })
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("votes_toggled_total", "Total number of vote toggles");
    metrics::describe_counter!("bookmarks_toggled_total", "Total number of bookmark toggles");
    metrics::describe_counter!("questions_created_total", "Total number of questions asked");
    metrics::describe_counter!("answers_created_total", "Total number of answers posted");
    metrics::describe_counter!(
        "recommendations_served_total",
        "Total number of recommendation queries"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录投票切换
///
/// `transition` 取值：cast / retract / switch
#[inline]
pub fn record_vote_toggle(target: &'static str, polarity: &'static str, transition: &'static str) {
    metrics::counter!(
        "votes_toggled_total",
        "target" => target,
        "polarity" => polarity,
        "transition" => transition
    )
    .increment(1);
}

/// 记录收藏切换，`result` 为 added / removed
#[inline]
pub fn record_bookmark_toggle(result: &'static str) {
    metrics::counter!("bookmarks_toggled_total", "result" => result).increment(1);
}

/// 记录新建提问
#[inline]
pub fn record_question_created(tag_count: usize) {
    metrics::counter!("questions_created_total").increment(1);
    metrics::histogram!("question_tag_count").record(tag_count as f64);
}

/// 记录新建回答
#[inline]
pub fn record_answer_created() {
    metrics::counter!("answers_created_total").increment(1);
}

/// 记录推荐查询，`scope` 为 tags / trending / search
#[inline]
pub fn record_recommendation(scope: &'static str) {
    metrics::counter!("recommendations_served_total", "scope" => scope).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        record_http_request("GET", "/api/v1/questions", 200, 0.1);
        record_vote_toggle("question", "up", "cast");
        record_bookmark_toggle("added");
        record_question_created(3);
        record_answer_created();
        record_recommendation("trending");
    }
}
