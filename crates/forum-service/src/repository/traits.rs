//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use uuid::Uuid;

use crate::dto::QuestionSummaryDto;
use crate::error::Result;
use crate::models::{BookmarkChange, Polarity, RecommendationScope, TogglePlan, VoteTarget};

/// 投票与收藏仓储接口
///
/// 每次切换都是一个独立事务：读取当前状态、计算计划、按顺序执行变更。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepositoryTrait: Send + Sync {
    async fn toggle_vote(
        &self,
        target: VoteTarget,
        user_id: Uuid,
        target_id: Uuid,
        requested: Polarity,
    ) -> Result<TogglePlan>;

    async fn toggle_bookmark(&self, user_id: Uuid, question_id: Uuid) -> Result<BookmarkChange>;
}

/// 推荐仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationRepositoryTrait: Send + Sync {
    /// 用户行为关联过的标签（去重）
    async fn interacted_tag_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    async fn count_recommended(
        &self,
        user_id: Uuid,
        scope: &RecommendationScope,
        search_pattern: Option<String>,
    ) -> Result<i64>;

    async fn list_recommended(
        &self,
        user_id: Uuid,
        scope: &RecommendationScope,
        search_pattern: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QuestionSummaryDto>>;
}
