//! 投票与收藏仓储
//!
//! 切换在单个事务内完成：先锁定投票人所在行使同一用户的并发切换串行化，
//! 再读取现有记录、计算计划并按顺序执行删除/插入。任一步失败（例如对象已被删除导致
//! 外键冲突）事务整体回滚，不会留下只删未插的中间状态。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::traits::VoteRepositoryTrait;
use crate::error::{ForumError, Result};
use crate::models::{BookmarkChange, Polarity, TogglePlan, VoteMutation, VoteState, VoteTarget};

/// 投票与收藏仓储
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 锁定投票人，同一用户的切换按提交顺序串行
    async fn lock_voter(conn: &mut PgConnection, user_id: Uuid) -> Result<()> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(ForumError::UserNotFound(user_id))?;
        Ok(())
    }

    /// 读取投票状态
    pub async fn get_vote_in_tx(
        conn: &mut PgConnection,
        target: VoteTarget,
        user_id: Uuid,
        target_id: Uuid,
    ) -> Result<VoteState> {
        let sql = format!(
            "SELECT polarity FROM {} WHERE user_id = $1 AND {} = $2",
            target.table(),
            target.id_column()
        );
        let polarity: Option<Polarity> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(target_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(polarity.into())
    }

    /// 执行单条投票变更
    pub async fn apply_mutation_in_tx(
        conn: &mut PgConnection,
        target: VoteTarget,
        user_id: Uuid,
        target_id: Uuid,
        mutation: VoteMutation,
    ) -> Result<()> {
        match mutation {
            VoteMutation::Delete(polarity) => {
                let sql = format!(
                    "DELETE FROM {} WHERE user_id = $1 AND {} = $2 AND polarity = $3",
                    target.table(),
                    target.id_column()
                );
                sqlx::query(&sql)
                    .bind(user_id)
                    .bind(target_id)
                    .bind(polarity)
                    .execute(&mut *conn)
                    .await?;
            }
            VoteMutation::Insert(polarity) => {
                let sql = format!(
                    "INSERT INTO {} (user_id, {}, polarity) VALUES ($1, $2, $3)",
                    target.table(),
                    target.id_column()
                );
                sqlx::query(&sql)
                    .bind(user_id)
                    .bind(target_id)
                    .bind(polarity)
                    .execute(&mut *conn)
                    .await?;
            }
        }
        Ok(())
    }

    async fn bookmark_exists(conn: &mut PgConnection, user_id: Uuid, question_id: Uuid) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM question_bookmarks WHERE user_id = $1 AND question_id = $2)",
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists.0)
    }
}

#[async_trait]
impl VoteRepositoryTrait for VoteRepository {
    async fn toggle_vote(
        &self,
        target: VoteTarget,
        user_id: Uuid,
        target_id: Uuid,
        requested: Polarity,
    ) -> Result<TogglePlan> {
        let mut tx = self.pool.begin().await?;

        Self::lock_voter(&mut tx, user_id).await?;
        let existing = Self::get_vote_in_tx(&mut tx, target, user_id, target_id).await?;
        let plan = TogglePlan::new(existing, requested);

        for mutation in &plan.mutations {
            Self::apply_mutation_in_tx(&mut tx, target, user_id, target_id, *mutation).await?;
        }

        tx.commit().await?;

        debug!(
            votable = target.as_str(),
            %user_id,
            %target_id,
            before = ?plan.before,
            after = ?plan.after,
            "Vote toggle committed"
        );

        Ok(plan)
    }

    async fn toggle_bookmark(&self, user_id: Uuid, question_id: Uuid) -> Result<BookmarkChange> {
        let mut tx = self.pool.begin().await?;

        Self::lock_voter(&mut tx, user_id).await?;
        let change = BookmarkChange::new(Self::bookmark_exists(&mut tx, user_id, question_id).await?);

        match change {
            BookmarkChange::Removed => {
                sqlx::query("DELETE FROM question_bookmarks WHERE user_id = $1 AND question_id = $2")
                    .bind(user_id)
                    .bind(question_id)
                    .execute(&mut *tx)
                    .await?;
            }
            BookmarkChange::Added => {
                sqlx::query("INSERT INTO question_bookmarks (user_id, question_id) VALUES ($1, $2)")
                    .bind(user_id)
                    .bind(question_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(change)
    }
}
