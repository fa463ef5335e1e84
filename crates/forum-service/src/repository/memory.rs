//! 内存版投票仓储（仅测试使用）
//!
//! 以行集合模拟投票表和收藏表，插入时检查 (user, 对象) 主键，
//! 变更先作用于副本、全部成功后才替换，模拟事务的原子性。

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::traits::VoteRepositoryTrait;
use crate::error::{ForumError, Result};
use crate::models::{BookmarkChange, Polarity, TogglePlan, VoteMutation, VoteState, VoteTarget};

type VoteRow = (VoteTarget, Uuid, Uuid, Polarity);

#[derive(Default)]
pub struct InMemoryVoteRepository {
    votes: Mutex<HashSet<VoteRow>>,
    bookmarks: Mutex<HashSet<(Uuid, Uuid)>>,
    /// 模拟已删除的对象：对其插入会触发外键冲突
    missing_targets: Mutex<HashSet<Uuid>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_missing(&self, target_id: Uuid) {
        self.missing_targets.lock().unwrap().insert(target_id);
    }

    /// 某 (用户, 对象) 的所有投票行
    pub fn rows_for(&self, target: VoteTarget, user_id: Uuid, target_id: Uuid) -> Vec<Polarity> {
        self.votes
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, u, id, _)| *t == target && *u == user_id && *id == target_id)
            .map(|(_, _, _, p)| *p)
            .collect()
    }

    pub fn count(&self, target: VoteTarget, target_id: Uuid, polarity: Polarity) -> usize {
        self.votes
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _, id, p)| *t == target && *id == target_id && *p == polarity)
            .count()
    }

    pub fn state(&self, target: VoteTarget, user_id: Uuid, target_id: Uuid) -> VoteState {
        Self::state_of(&self.votes.lock().unwrap(), target, user_id, target_id)
    }

    pub fn has_bookmark(&self, user_id: Uuid, question_id: Uuid) -> bool {
        self.bookmarks.lock().unwrap().contains(&(user_id, question_id))
    }

    fn state_of(rows: &HashSet<VoteRow>, target: VoteTarget, user_id: Uuid, target_id: Uuid) -> VoteState {
        rows.iter()
            .find(|(t, u, id, _)| *t == target && *u == user_id && *id == target_id)
            .map(|(_, _, _, p)| *p)
            .into()
    }
}

#[async_trait]
impl VoteRepositoryTrait for InMemoryVoteRepository {
    async fn toggle_vote(
        &self,
        target: VoteTarget,
        user_id: Uuid,
        target_id: Uuid,
        requested: Polarity,
    ) -> Result<TogglePlan> {
        let mut votes = self.votes.lock().unwrap();
        let missing = self.missing_targets.lock().unwrap().contains(&target_id);

        let plan = TogglePlan::new(Self::state_of(&votes, target, user_id, target_id), requested);

        let mut staged = votes.clone();
        for mutation in &plan.mutations {
            match *mutation {
                VoteMutation::Delete(p) => {
                    staged.remove(&(target, user_id, target_id, p));
                }
                VoteMutation::Insert(p) => {
                    if missing {
                        return Err(ForumError::ReferenceViolation(target.table().to_string()));
                    }
                    if Self::state_of(&staged, target, user_id, target_id) != VoteState::None {
                        return Err(ForumError::Conflict(format!("{}_pkey", target.table())));
                    }
                    staged.insert((target, user_id, target_id, p));
                }
            }
        }

        *votes = staged;
        Ok(plan)
    }

    async fn toggle_bookmark(&self, user_id: Uuid, question_id: Uuid) -> Result<BookmarkChange> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        let change = BookmarkChange::new(bookmarks.contains(&(user_id, question_id)));
        match change {
            BookmarkChange::Removed => {
                bookmarks.remove(&(user_id, question_id));
            }
            BookmarkChange::Added => {
                if self.missing_targets.lock().unwrap().contains(&question_id) {
                    return Err(ForumError::ReferenceViolation("question_bookmarks".into()));
                }
                bookmarks.insert((user_id, question_id));
            }
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scenario_up_down_down() {
        let repo = InMemoryVoteRepository::new();
        let (v, q) = (Uuid::new_v4(), Uuid::new_v4());
        let t = VoteTarget::Question;

        repo.toggle_vote(t, v, q, Polarity::Up).await.unwrap();
        assert_eq!(repo.state(t, v, q), VoteState::Up);
        assert_eq!(repo.count(t, q, Polarity::Up), 1);

        repo.toggle_vote(t, v, q, Polarity::Down).await.unwrap();
        assert_eq!(repo.state(t, v, q), VoteState::Down);
        assert_eq!(repo.count(t, q, Polarity::Up), 0);
        assert_eq!(repo.count(t, q, Polarity::Down), 1);

        repo.toggle_vote(t, v, q, Polarity::Down).await.unwrap();
        assert_eq!(repo.state(t, v, q), VoteState::None);
        assert!(repo.rows_for(t, v, q).is_empty());
    }

    #[tokio::test]
    async fn test_any_sequence_leaves_at_most_one_row() {
        let repo = InMemoryVoteRepository::new();
        let (v, a) = (Uuid::new_v4(), Uuid::new_v4());
        let t = VoteTarget::Answer;

        // 固定伪随机序列，覆盖所有转换
        let sequence = [
            Polarity::Up, Polarity::Up, Polarity::Down, Polarity::Up, Polarity::Down,
            Polarity::Down, Polarity::Down, Polarity::Up, Polarity::Up, Polarity::Down,
        ];
        for requested in sequence {
            repo.toggle_vote(t, v, a, requested).await.unwrap();
            assert!(repo.rows_for(t, v, a).len() <= 1);
        }
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_delete() {
        let repo = InMemoryVoteRepository::new();
        let (v, q) = (Uuid::new_v4(), Uuid::new_v4());
        let t = VoteTarget::Question;

        repo.toggle_vote(t, v, q, Polarity::Up).await.unwrap();
        repo.mark_missing(q);

        let err = repo.toggle_vote(t, v, q, Polarity::Down).await.unwrap_err();
        assert!(matches!(err, ForumError::ReferenceViolation(_)));
        // 删除 up 的步骤随插入失败一起回滚
        assert_eq!(repo.rows_for(t, v, q), vec![Polarity::Up]);
    }

    #[tokio::test]
    async fn test_targets_are_independent() {
        let repo = InMemoryVoteRepository::new();
        let (v, id) = (Uuid::new_v4(), Uuid::new_v4());

        repo.toggle_vote(VoteTarget::Question, v, id, Polarity::Up).await.unwrap();
        repo.toggle_vote(VoteTarget::Answer, v, id, Polarity::Down).await.unwrap();

        assert_eq!(repo.state(VoteTarget::Question, v, id), VoteState::Up);
        assert_eq!(repo.state(VoteTarget::Answer, v, id), VoteState::Down);
    }

    #[tokio::test]
    async fn test_bookmark_toggle_twice_restores_membership() {
        let repo = InMemoryVoteRepository::new();
        let (u, q) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(!repo.has_bookmark(u, q));
        assert_eq!(repo.toggle_bookmark(u, q).await.unwrap(), BookmarkChange::Added);
        assert!(repo.has_bookmark(u, q));
        assert_eq!(repo.toggle_bookmark(u, q).await.unwrap(), BookmarkChange::Removed);
        assert!(!repo.has_bookmark(u, q));
    }
}
