//! 请求 DTO 定义
//!
//! 请求体字段使用 camelCase，校验规则通过 validator 声明

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// 单个标签名最大长度
pub const MAX_TAG_LEN: usize = 15;

/// 页码上限，超出后按最后一页处理
pub const MAX_PAGE: i64 = 10_000;

/// 将用户输入转为子串匹配的 ILIKE 模式
///
/// `\`、`%`、`_` 按字面匹配，SQL 侧配合 `ESCAPE '\'` 使用
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// ==================== 通用查询参数 ====================

/// 列表查询参数
///
/// 所有列表接口共用 `page` / `pageSize` / `filter` / `searchQuery`，
/// 每页默认条数由具体接口决定。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    pub page_size: Option<i64>,
    pub filter: Option<String>,
    pub search_query: Option<String>,
}

fn default_page() -> i64 {
    1
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: None,
            filter: None,
            search_query: None,
        }
    }
}

impl ListQuery {
    /// 页码（1 到 MAX_PAGE）
    pub fn page(&self) -> i64 {
        self.page.clamp(1, MAX_PAGE)
    }

    /// 获取限制条数（最大100）
    pub fn limit(&self, default_size: i64) -> i64 {
        self.page_size.unwrap_or(default_size).clamp(1, 100)
    }

    /// 计算数据库查询的 offset
    pub fn offset(&self, default_size: i64) -> i64 {
        (self.page() - 1).saturating_mul(self.limit(default_size))
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// 搜索词对应的 ILIKE 模式，空白搜索词视为未提供
    pub fn search_pattern(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern)
    }
}

/// 全局搜索参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalSearchQuery {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub search_type: Option<String>,
}

// ==================== 认证 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 100, message = "name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "email must be provided"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "password and passwordConfirm do not match"))]
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be provided"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "newPassword and passwordConfirm do not match"))]
    pub password_confirm: String,
}

// ==================== 问题 ====================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 100, message = "content must be at least 100 characters"))]
    pub content: String,
    #[validate(length(min = 1, max = 5), custom(function = "validate_tag_names"))]
    pub tags: Vec<String>,
    pub author: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 100, message = "content must be at least 100 characters"))]
    pub content: Option<String>,
}

/// 问题投票 / 收藏请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionActionRequest {
    pub user_id: Uuid,
    pub question_id: Uuid,
}

// ==================== 回答 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1))]
    pub content: String,
    pub author: Uuid,
    pub question_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAnswerRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

/// 回答投票请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerVoteRequest {
    pub user_id: Uuid,
    pub question_answered_id: Uuid,
}

// ==================== 用户 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(url)]
    pub portfolio_website: Option<String>,
}

/// 校验每个标签名长度为 1..=15
fn validate_tag_names(tags: &[String]) -> Result<(), ValidationError> {
    let invalid = tags.iter().any(|t| {
        let len = t.trim().chars().count();
        len == 0 || len > MAX_TAG_LEN
    });
    if invalid {
        let mut err = ValidationError::new("tag_length");
        err.message = Some("each tag must be 1 to 15 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_content() -> String {
        "x".repeat(120)
    }

    #[test]
    fn test_list_query_defaults() {
        let q = ListQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(10), 10);
        assert_eq!(q.offset(10), 0);
        assert!(q.search_pattern().is_none());
    }

    #[test]
    fn test_list_query_clamps_and_offsets() {
        let q = ListQuery {
            page: 3,
            page_size: Some(500),
            ..Default::default()
        };
        assert_eq!(q.limit(10), 100);
        assert_eq!(q.offset(10), 200);

        let q = ListQuery {
            page: 0,
            page_size: Some(5),
            ..Default::default()
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.offset(10), 0);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let q = ListQuery {
            page: i64::MAX,
            page_size: Some(100),
            ..Default::default()
        };
        assert_eq!(q.page(), MAX_PAGE);
        assert_eq!(q.offset(10), (MAX_PAGE - 1) * 100);

        let q = ListQuery {
            page: i64::MIN,
            ..Default::default()
        };
        assert_eq!(q.offset(10), 0);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_done"), r"%100\%\_done%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");

        let q = ListQuery {
            search_query: Some("  50%  ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_pattern().as_deref(), Some(r"%50\%%"));
    }

    #[test]
    fn test_list_query_deserialize_camel_case() {
        let q: ListQuery =
            serde_json::from_str(r#"{"page":2,"pageSize":8,"filter":"name","searchQuery":"rust"}"#)
                .unwrap();
        assert_eq!(q.page, 2);
        assert_eq!(q.limit(20), 8);
        assert_eq!(q.filter(), Some("name"));
        assert_eq!(q.search_pattern().as_deref(), Some("%rust%"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let q = ListQuery {
            search_query: Some("   ".into()),
            ..Default::default()
        };
        assert!(q.search_pattern().is_none());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let req = SignupRequest {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "password123".into(),
            password_confirm: "password124".into(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn test_create_question_validation() {
        let valid = CreateQuestionRequest {
            title: "How do lifetimes work?".into(),
            content: long_content(),
            tags: vec!["rust".into(), "lifetimes".into()],
            author: Uuid::new_v4(),
        };
        assert!(valid.validate().is_ok());

        let short = CreateQuestionRequest {
            content: "too short".into(),
            ..valid_question()
        };
        assert!(short.validate().is_err());

        let no_tags = CreateQuestionRequest {
            tags: vec![],
            ..valid_question()
        };
        assert!(no_tags.validate().is_err());

        let long_tag = CreateQuestionRequest {
            tags: vec!["a-very-long-tag-name".into()],
            ..valid_question()
        };
        assert!(long_tag.validate().is_err());

        let too_many = CreateQuestionRequest {
            tags: (0..6).map(|i| format!("t{i}")).collect(),
            ..valid_question()
        };
        assert!(too_many.validate().is_err());
    }

    fn valid_question() -> CreateQuestionRequest {
        CreateQuestionRequest {
            title: "title".into(),
            content: long_content(),
            tags: vec!["rust".into()],
            author: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_update_profile_validation() {
        let req = UpdateProfileRequest {
            name: "Alice".into(),
            username: None,
            email: "alice@example.com".into(),
            bio: Some("b".repeat(501)),
            location: None,
            portfolio_website: Some("not a url".into()),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("bio"));
        assert!(fields.contains_key("portfolio_website"));
    }

    #[test]
    fn test_vote_request_deserialize() {
        let req: AnswerVoteRequest = serde_json::from_str(&format!(
            r#"{{"userId":"{}","questionAnsweredId":"{}"}}"#,
            Uuid::nil(),
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(req.user_id, Uuid::nil());
    }
}
