//! 问题推荐服务
//!
//! 1. 汇总用户行为关联过的标签
//! 2. 有标签：推荐标签有交集的问题
//! 3. 无标签且无搜索词：回退到近 7 天浏览量不低于 100 的问题
//!
//! 任何情况下都排除用户本人的问题。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use forum_shared::observability::metrics;

use crate::dto::{ListQuery, PageResponse, QuestionSummaryDto};
use crate::error::Result;
use crate::models::RecommendationScope;
use crate::repository::RecommendationRepositoryTrait;

/// 推荐列表默认每页条数
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 问题推荐服务
pub struct RecommendationService<R = crate::repository::InteractionRepository>
where
    R: RecommendationRepositoryTrait,
{
    repo: Arc<R>,
}

impl<R> RecommendationService<R>
where
    R: RecommendationRepositoryTrait,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, query))]
    pub async fn recommend(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<PageResponse<QuestionSummaryDto>> {
        let tag_ids = self.repo.interacted_tag_ids(user_id).await?;
        let search = query.search_pattern();
        let scope = RecommendationScope::new(tag_ids, search.is_some(), Utc::now());

        let limit = query.limit(DEFAULT_PAGE_SIZE);
        let offset = query.offset(DEFAULT_PAGE_SIZE);

        let (total, items) = futures::try_join!(
            self.repo.count_recommended(user_id, &scope, search.clone()),
            self.repo
                .list_recommended(user_id, &scope, search.clone(), limit, offset),
        )?;

        metrics::record_recommendation(scope.as_str());
        debug!(scope = scope.as_str(), total, "Recommendations served");

        Ok(PageResponse::new(items, total, query.page(), limit))
    }
}
