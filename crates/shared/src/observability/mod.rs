//! 统一可观测性模块
//!
//! 提供日志与 Prometheus 指标的统一初始化。
//! 服务通过单一入口点配置可观测性，确保一致的日志格式和指标命名。

pub mod logging;
pub mod metrics;
pub mod middleware;

use ::tracing::info;

use crate::config::ObservabilityConfig;
use crate::error::Result;

/// 可观测性资源守卫
///
/// 持有 Prometheus handle 的生命周期，Drop 时输出关闭日志。
pub struct ObservabilityGuard {
    metrics_handle: Option<metrics::MetricsHandle>,
}

impl ObservabilityGuard {
    /// 创建一个空的 Guard（用于测试或禁用可观测性时）
    pub fn empty() -> Self {
        Self {
            metrics_handle: None,
        }
    }

    /// 指标句柄，未启用指标时为 None
    pub fn metrics(&self) -> Option<&metrics::MetricsHandle> {
        self.metrics_handle.as_ref()
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!("Shutting down observability...");
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. 日志（tracing subscriber）
/// 2. 指标（Prometheus recorder，可关闭）
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    logging::init(config)?;

    let metrics_handle = if config.metrics_enabled {
        Some(metrics::init(service_name)?)
    } else {
        None
    };

    info!(
        service = %service_name,
        log_format = %config.log_format,
        metrics_enabled = config.metrics_enabled,
        "Observability initialized"
    );

    Ok(ObservabilityGuard { metrics_handle })
}
