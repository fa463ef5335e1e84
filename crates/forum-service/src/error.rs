//! 论坛服务错误类型定义
//!
//! 业务错误直接把 Display 文本返回给客户端；系统错误只返回通用提示，
//! 开发环境下额外附带 `detail` 字段便于排查。

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

/// Postgres 唯一约束冲突
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres 外键约束冲突
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

const GENERIC_MESSAGE: &str = "服务内部错误，请稍后重试";

/// 是否在错误响应中附带详细信息（仅开发环境开启）
static VERBOSE_ERRORS: AtomicBool = AtomicBool::new(false);

/// 设置错误响应的详细模式，启动时根据运行环境调用一次
pub fn set_verbose_errors(enabled: bool) {
    VERBOSE_ERRORS.store(enabled, Ordering::Relaxed);
}

fn verbose_errors() -> bool {
    VERBOSE_ERRORS.load(Ordering::Relaxed)
}

/// 论坛服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ForumError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("问题不存在: {0}")]
    QuestionNotFound(Uuid),
    #[error("回答不存在: {0}")]
    AnswerNotFound(Uuid),
    #[error("标签不存在: {0}")]
    TagNotFound(Uuid),
    #[error("用户不存在: {0}")]
    UserNotFound(Uuid),

    // 存储约束
    #[error("数据冲突: {0}")]
    Conflict(String),
    #[error("关联数据不存在: {0}")]
    ReferenceViolation(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ForumError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_) => StatusCode::BAD_REQUEST,

            Self::QuestionNotFound(_)
            | Self::AnswerNotFound(_)
            | Self::TagNotFound(_)
            | Self::UserNotFound(_) => StatusCode::NOT_FOUND,

            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ReferenceViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::QuestionNotFound(_) => "QUESTION_NOT_FOUND",
            Self::AnswerNotFound(_) => "ANSWER_NOT_FOUND",
            Self::TagNotFound(_) => "TAG_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::ReferenceViolation(_) => "REFERENCE_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_system(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// 构造响应体
    ///
    /// `verbose` 为 true 时附带 `detail` 字段（错误的完整描述）。
    pub fn body(&self, verbose: bool) -> serde_json::Value {
        let message = if self.is_system() {
            GENERIC_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let mut body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        if verbose {
            body["detail"] = json!(self.to_string());
        }

        body
    }
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Database(e) => tracing::error!(error = %e, "数据库操作失败"),
            Self::Internal(e) => tracing::error!(error = %e, "内部错误"),
            _ => {}
        }

        (status, axum::Json(self.body(verbose_errors()))).into_response()
    }
}

/// 从 sqlx 错误转换，识别唯一约束和外键约束冲突
impl From<sqlx::Error> for ForumError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => {
                    return Self::Conflict(
                        db_err
                            .constraint()
                            .map(|c| format!("违反唯一约束 {c}"))
                            .unwrap_or_else(|| "记录已存在".to_string()),
                    );
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return Self::ReferenceViolation(
                        db_err
                            .constraint()
                            .map(|c| format!("违反外键约束 {c}"))
                            .unwrap_or_else(|| "引用的记录不存在".to_string()),
                    );
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ForumError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<bcrypt::BcryptError> for ForumError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Internal(format!("密码哈希失败: {}", err))
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ForumError>;
