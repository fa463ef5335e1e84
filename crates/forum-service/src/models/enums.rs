//! 论坛枚举类型定义
//!
//! 投票相关枚举同时支持数据库（sqlx）和 JSON（serde）序列化；
//! 列表排序枚举从查询参数解析，未知取值回退到默认排序。

use serde::{Deserialize, Serialize};

/// 投票方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Polarity {
    Up,
    Down,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// 可投票对象类型
///
/// 每种对象对应一张投票表，主键为 (user_id, 对象 id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Question,
    Answer,
}

impl VoteTarget {
    /// 投票表名
    pub fn table(self) -> &'static str {
        match self {
            Self::Question => "question_votes",
            Self::Answer => "answer_votes",
        }
    }

    /// 投票表中对象 id 列名
    pub fn id_column(self) -> &'static str {
        match self {
            Self::Question => "question_id",
            Self::Answer => "answer_id",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

/// 用户行为类型，用于推荐的标签关联记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum InteractionAction {
    QuestionCreated,
    AnswerCreated,
}

/// 问题列表排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionFilter {
    #[default]
    Newest,
    /// 按浏览量
    Frequent,
    /// 仅无回答的问题
    Unanswered,
}

impl QuestionFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("frequent") => Self::Frequent,
            Some("unanswered") => Self::Unanswered,
            _ => Self::Newest,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            Self::Frequent => "q.views DESC, q.created_at DESC",
            Self::Newest | Self::Unanswered => "q.created_at DESC",
        }
    }

    pub fn unanswered_only(self) -> bool {
        matches!(self, Self::Unanswered)
    }
}

/// 回答列表排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerFilter {
    HighestUpvotes,
    /// 按反对票数降序
    LowestUpvotes,
    #[default]
    MostRecent,
    Oldest,
}

impl AnswerFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("highest-upvotes") => Self::HighestUpvotes,
            Some("lowest-upvotes") => Self::LowestUpvotes,
            Some("oldest") => Self::Oldest,
            _ => Self::MostRecent,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            Self::HighestUpvotes => "upvotes DESC, a.created_at DESC",
            Self::LowestUpvotes => "downvotes DESC, a.created_at DESC",
            Self::MostRecent => "a.created_at DESC",
            Self::Oldest => "a.created_at ASC",
        }
    }
}

/// 标签列表排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagFilter {
    #[default]
    Popular,
    Recent,
    Old,
    Name,
}

impl TagFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("recent_tag") => Self::Recent,
            Some("old_tag") => Self::Old,
            Some("name") => Self::Name,
            _ => Self::Popular,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            Self::Popular => "question_count DESC, t.name ASC",
            Self::Recent => "t.created_at DESC",
            Self::Old => "t.created_at ASC",
            Self::Name => "t.name ASC",
        }
    }
}

/// 用户列表排序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UserFilter {
    #[default]
    NewUsers,
    OldUsers,
    TopContributors,
}

impl UserFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("old_users") => Self::OldUsers,
            Some("top_contributors") => Self::TopContributors,
            _ => Self::NewUsers,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            Self::NewUsers => "u.created_at DESC",
            Self::OldUsers => "u.created_at ASC",
            Self::TopContributors => "u.reputation DESC, u.created_at ASC",
        }
    }
}

/// 收藏列表排序（按问题创建时间）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookmarkFilter {
    #[default]
    Newest,
    Oldest,
}

impl BookmarkFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("oldest") => Self::Oldest,
            _ => Self::Newest,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "q.created_at DESC",
            Self::Oldest => "q.created_at ASC",
        }
    }
}

/// 全局搜索对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Question,
    User,
    Answer,
    Tag,
}

impl SearchType {
    pub const ALL: [SearchType; 4] = [Self::Question, Self::User, Self::Answer, Self::Tag];

    /// 大小写不敏感解析，无法识别时返回 None（表示搜索全部类型）
    pub fn parse(value: Option<&str>) -> Option<Self> {
        let value = value?.trim().to_ascii_lowercase();
        match value.as_str() {
            "question" => Some(Self::Question),
            "user" => Some(Self::User),
            "answer" => Some(Self::Answer),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_serde() {
        assert_eq!(serde_json::to_string(&Polarity::Up).unwrap(), "\"up\"");
        let p: Polarity = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(p, Polarity::Down);
    }

    #[test]
    fn test_vote_target_tables() {
        assert_eq!(VoteTarget::Question.table(), "question_votes");
        assert_eq!(VoteTarget::Question.id_column(), "question_id");
        assert_eq!(VoteTarget::Answer.table(), "answer_votes");
        assert_eq!(VoteTarget::Answer.id_column(), "answer_id");
    }

    #[test]
    fn test_filters_fall_back_to_default() {
        assert_eq!(QuestionFilter::parse(Some("bogus")), QuestionFilter::Newest);
        assert_eq!(QuestionFilter::parse(None), QuestionFilter::Newest);
        assert_eq!(AnswerFilter::parse(Some("bogus")), AnswerFilter::MostRecent);
        assert_eq!(TagFilter::parse(None), TagFilter::Popular);
        assert_eq!(UserFilter::parse(Some("")), UserFilter::NewUsers);
        assert_eq!(BookmarkFilter::parse(Some("newest")), BookmarkFilter::Newest);
    }

    #[test]
    fn test_filters_parse_known_values() {
        assert_eq!(QuestionFilter::parse(Some("unanswered")), QuestionFilter::Unanswered);
        assert!(QuestionFilter::Unanswered.unanswered_only());
        assert_eq!(AnswerFilter::parse(Some("lowest-upvotes")), AnswerFilter::LowestUpvotes);
        assert!(AnswerFilter::LowestUpvotes.order_by().starts_with("downvotes DESC"));
        assert_eq!(TagFilter::parse(Some("old_tag")), TagFilter::Old);
        assert_eq!(UserFilter::parse(Some("top_contributors")), UserFilter::TopContributors);
        assert_eq!(BookmarkFilter::parse(Some("oldest")).order_by(), "q.created_at ASC");
    }

    #[test]
    fn test_search_type_parse_is_case_insensitive() {
        assert_eq!(SearchType::parse(Some("Question")), Some(SearchType::Question));
        assert_eq!(SearchType::parse(Some("TAG")), Some(SearchType::Tag));
        assert_eq!(SearchType::parse(Some("comment")), None);
        assert_eq!(SearchType::parse(None), None);
    }
}
