//! 推荐范围
//!
//! 根据用户行为关联过的标签决定推荐哪些问题，不做打分或排序加权。

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// 热门回退条件：最低浏览量
pub const TRENDING_MIN_VIEWS: i32 = 100;
/// 热门回退条件：统计窗口（天）
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// 推荐查询范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationScope {
    /// 标签集合与用户关联标签有交集的问题
    Tags(Vec<Uuid>),
    /// 用户没有任何标签关联且未提供搜索词：近期热门问题
    Trending {
        min_views: i32,
        since: DateTime<Utc>,
    },
    /// 用户没有任何标签关联但提供了搜索词：仅按搜索词过滤
    Search,
}

impl RecommendationScope {
    pub fn new(tag_ids: Vec<Uuid>, has_search: bool, now: DateTime<Utc>) -> Self {
        if !tag_ids.is_empty() {
            Self::Tags(tag_ids)
        } else if has_search {
            Self::Search
        } else {
            Self::Trending {
                min_views: TRENDING_MIN_VIEWS,
                since: now - Duration::days(TRENDING_WINDOW_DAYS),
            }
        }
    }

    pub fn tag_ids(&self) -> Option<&[Uuid]> {
        match self {
            Self::Tags(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn min_views(&self) -> Option<i32> {
        match self {
            Self::Trending { min_views, .. } => Some(*min_views),
            _ => None,
        }
    }

    pub fn created_since(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Trending { since, .. } => Some(*since),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tags(_) => "tags",
            Self::Trending { .. } => "trending",
            Self::Search => "search",
        }
    }
}
