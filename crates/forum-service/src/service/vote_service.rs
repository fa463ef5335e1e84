//! 投票与收藏服务
//!
//! 在仓储的事务性切换之上做操作人校验、日志和指标记录。
//! 对外只返回固定的成功消息，调用方需重新拉取状态。

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use forum_shared::observability::metrics;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::models::{BookmarkChange, Polarity, TogglePlan, VoteTarget};
use crate::repository::VoteRepositoryTrait;

/// 投票与收藏服务
pub struct VoteService<R = crate::repository::VoteRepository>
where
    R: VoteRepositoryTrait,
{
    repo: Arc<R>,
}

impl<R> VoteService<R>
where
    R: VoteRepositoryTrait,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 切换投票
    ///
    /// `voter_id` 来自请求体，必须与当前登录用户一致。
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn toggle_vote(
        &self,
        actor: &CurrentUser,
        voter_id: Uuid,
        target: VoteTarget,
        target_id: Uuid,
        requested: Polarity,
    ) -> Result<TogglePlan> {
        actor.ensure_is(voter_id)?;

        let plan = self
            .repo
            .toggle_vote(target, voter_id, target_id, requested)
            .await?;

        let transition = plan.transition();
        metrics::record_vote_toggle(target.as_str(), requested.as_str(), transition.as_str());

        info!(
            votable = target.as_str(),
            %target_id,
            polarity = requested.as_str(),
            transition = transition.as_str(),
            "Vote toggled"
        );

        Ok(plan)
    }

    /// 切换收藏
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn toggle_bookmark(
        &self,
        actor: &CurrentUser,
        user_id: Uuid,
        question_id: Uuid,
    ) -> Result<BookmarkChange> {
        actor.ensure_is(user_id)?;

        let change = self.repo.toggle_bookmark(user_id, question_id).await?;
        metrics::record_bookmark_toggle(change.as_str());

        info!(%question_id, result = change.as_str(), "Bookmark toggled");

        Ok(change)
    }
}
