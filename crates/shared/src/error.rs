//! 基础设施错误类型
//!
//! 仅覆盖连接池、迁移、配置等启动期错误；业务错误由各服务自行定义。

use thiserror::Error;

/// 基础设施错误
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("可观测性初始化失败: {0}")]
    Observability(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, InfraError>;

impl InfraError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Migration(_) => "MIGRATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Observability(_) => "OBSERVABILITY_ERROR",
        }
    }

    /// 是否为可重试错误（连接池耗尽、网络抖动等）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = InfraError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.code(), "DATABASE_ERROR");

        let err = InfraError::Config(config::ConfigError::Message("bad".into()));
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_is_retryable() {
        assert!(InfraError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!InfraError::Database(sqlx::Error::RowNotFound).is_retryable());
        assert!(!InfraError::Observability("recorder".into()).is_retryable());
    }
}
