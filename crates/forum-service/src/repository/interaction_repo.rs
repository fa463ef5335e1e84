//! 用户行为仓储
//!
//! 记录提问/回答行为及其关联标签，并基于这些标签提供推荐查询。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::question_repo::{QUESTION_SUMMARY_SQL, QuestionRepository, QuestionSummaryRow};
use super::traits::RecommendationRepositoryTrait;
use crate::dto::QuestionSummaryDto;
use crate::error::Result;
use crate::models::{InteractionAction, RecommendationScope};

/// 推荐查询条件
///
/// $1 当前用户（排除其本人的问题），$2 标签集合，$3 最低浏览量，
/// $4 创建时间下限，$5 搜索模式；为 NULL 的条件不生效。
const RECOMMENDATION_WHERE: &str = r#"
    WHERE q.author_id <> $1
      AND ($2::uuid[] IS NULL OR EXISTS (
            SELECT 1 FROM question_tags qt
            WHERE qt.question_id = q.id AND qt.tag_id = ANY($2)
          ))
      AND ($3::int IS NULL OR q.views >= $3)
      AND ($4::timestamptz IS NULL OR q.created_at >= $4)
      AND ($5::text IS NULL OR q.title ILIKE $5 ESCAPE '\' OR q.content ILIKE $5 ESCAPE '\')
"#;

/// 用户行为仓储
pub struct InteractionRepository {
    pool: PgPool,
}

impl InteractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 记录一次行为，并把相关问题的全部标签关联到该行为
    pub async fn log_in_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        action: InteractionAction,
        question_id: Uuid,
        answer_id: Option<Uuid>,
    ) -> Result<Uuid> {
        let interaction_id = Uuid::now_v7();

        sqlx::query(
            r#"
            INSERT INTO interactions (id, user_id, action, question_id, answer_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(interaction_id)
        .bind(user_id)
        .bind(action)
        .bind(question_id)
        .bind(answer_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO tag_interactions (interaction_id, tag_id)
            SELECT $1, qt.tag_id FROM question_tags qt WHERE qt.question_id = $2
            "#,
        )
        .bind(interaction_id)
        .bind(question_id)
        .execute(&mut *conn)
        .await?;

        Ok(interaction_id)
    }
}

#[async_trait]
impl RecommendationRepositoryTrait for InteractionRepository {
    async fn interacted_tag_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT ti.tag_id
            FROM tag_interactions ti
            JOIN interactions i ON i.id = ti.interaction_id
            WHERE i.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn count_recommended(
        &self,
        user_id: Uuid,
        scope: &RecommendationScope,
        search_pattern: Option<String>,
    ) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM questions q {}", RECOMMENDATION_WHERE);
        let total: (i64,) = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(scope.tag_ids().map(<[Uuid]>::to_vec))
            .bind(scope.min_views())
            .bind(scope.created_since())
            .bind(search_pattern)
            .fetch_one(&self.pool)
            .await?;
        Ok(total.0)
    }

    async fn list_recommended(
        &self,
        user_id: Uuid,
        scope: &RecommendationScope,
        search_pattern: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QuestionSummaryDto>> {
        let sql = format!(
            "{} {} ORDER BY q.created_at DESC LIMIT $6 OFFSET $7",
            QUESTION_SUMMARY_SQL, RECOMMENDATION_WHERE
        );
        let rows = sqlx::query_as::<_, QuestionSummaryRow>(&sql)
            .bind(user_id)
            .bind(scope.tag_ids().map(<[Uuid]>::to_vec))
            .bind(scope.min_views())
            .bind(scope.created_since())
            .bind(search_pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        QuestionRepository::with_tags(&self.pool, rows).await
    }
}
