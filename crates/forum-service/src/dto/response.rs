//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::SearchType;

/// 分页响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub is_next: bool,
}

impl<T> PageResponse<T> {
    /// 创建分页响应
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
            is_next: page < total_pages,
        }
    }

    /// 创建空分页响应
    pub fn empty(page: i64, page_size: i64) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }
}

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 创建仅包含消息的成功响应
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ==================== 用户 ====================

/// 用户公开信息
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub portfolio_website: Option<String>,
    pub picture: Option<String>,
    pub reputation: i32,
    pub created_at: DateTime<Utc>,
}

/// 登录 / 注册响应
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

/// 用户主页
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    pub user: UserDto,
    pub question_count: i64,
    pub answer_count: i64,
}

/// 用户统计
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsDto {
    pub reputation: i32,
    pub question_count: i64,
    pub answer_count: i64,
    pub question_upvotes: i64,
    pub answer_upvotes: i64,
}

/// 用户常用标签
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserTagDto {
    pub id: Uuid,
    pub name: String,
    pub count: i64,
}

// ==================== 问题 ====================

/// 作者摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: Uuid,
    pub name: String,
    pub picture: Option<String>,
}

/// 标签引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TagRef {
    pub id: Uuid,
    pub name: String,
}

/// 问题列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<TagRef>,
    pub author: AuthorDto,
    pub upvotes: i64,
    pub downvotes: i64,
    pub answer_count: i64,
    pub views: i32,
    pub created_at: DateTime<Utc>,
}

/// 问题详情
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetailDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<TagRef>,
    pub author: AuthorDto,
    pub views: i32,
    pub upvoters: Vec<Uuid>,
    pub downvoters: Vec<Uuid>,
    pub bookmarked_by: Vec<Uuid>,
    pub answers: Vec<AnswerDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 热门问题
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopQuestionDto {
    pub id: Uuid,
    pub title: String,
    pub views: i32,
    pub upvotes: i64,
}

/// 浏览量
#[derive(Debug, Clone, Serialize)]
pub struct ViewCountDto {
    pub id: Uuid,
    pub views: i32,
}

// ==================== 回答 ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDto {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
    pub author: AuthorDto,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==================== 标签 ====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub question_count: i64,
    pub created_at: DateTime<Utc>,
}

/// 标签详情及其下的问题
#[derive(Debug, Serialize)]
pub struct TagDetailDto {
    pub tag: TagDto,
    pub questions: PageResponse<QuestionSummaryDto>,
}

// ==================== 通用 ====================

/// 创建成功响应
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// 全局搜索结果项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: SearchType,
}
