//! 投票与收藏切换规则
//!
//! 切换是纯函数：根据当前状态和请求方向计算出需要执行的行级变更，
//! 由仓储在同一事务中按顺序执行。
//!
//! ## 状态转换
//!
//! | 当前 | 请求 | 变更 | 结果 |
//! |------|------|------|------|
//! | none | up   | insert up | up |
//! | up   | up   | delete up | none |
//! | down | up   | delete down, insert up | up |
//!
//! `down` 方向对称。改变方向总是先删除再插入，从不原地更新。

use super::enums::Polarity;

/// 某用户对某对象的投票状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoteState {
    #[default]
    None,
    Up,
    Down,
}

impl VoteState {
    pub fn polarity(self) -> Option<Polarity> {
        match self {
            Self::None => None,
            Self::Up => Some(Polarity::Up),
            Self::Down => Some(Polarity::Down),
        }
    }
}

impl From<Option<Polarity>> for VoteState {
    fn from(polarity: Option<Polarity>) -> Self {
        match polarity {
            None => Self::None,
            Some(Polarity::Up) => Self::Up,
            Some(Polarity::Down) => Self::Down,
        }
    }
}

/// 单条投票记录的变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteMutation {
    Delete(Polarity),
    Insert(Polarity),
}

/// 切换类型，用于日志和指标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// none -> X
    Cast,
    /// X -> none
    Retract,
    /// X -> 相反方向
    Switch,
}

impl VoteTransition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cast => "cast",
            Self::Retract => "retract",
            Self::Switch => "switch",
        }
    }
}

/// 一次投票切换的执行计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePlan {
    pub before: VoteState,
    pub after: VoteState,
    pub mutations: Vec<VoteMutation>,
}

impl TogglePlan {
    /// 计算切换计划
    pub fn new(existing: VoteState, requested: Polarity) -> Self {
        match existing.polarity() {
            Some(current) if current == requested => Self {
                before: existing,
                after: VoteState::None,
                mutations: vec![VoteMutation::Delete(requested)],
            },
            Some(current) => Self {
                before: existing,
                after: Some(requested).into(),
                mutations: vec![VoteMutation::Delete(current), VoteMutation::Insert(requested)],
            },
            None => Self {
                before: existing,
                after: Some(requested).into(),
                mutations: vec![VoteMutation::Insert(requested)],
            },
        }
    }

    pub fn transition(&self) -> VoteTransition {
        match (self.before, self.after) {
            (VoteState::None, _) => VoteTransition::Cast,
            (_, VoteState::None) => VoteTransition::Retract,
            _ => VoteTransition::Switch,
        }
    }
}

/// 收藏切换结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkChange {
    Added,
    Removed,
}

impl BookmarkChange {
    /// 已收藏则移除，否则添加
    pub fn new(exists: bool) -> Self {
        if exists { Self::Removed } else { Self::Added }
    }

    pub fn is_bookmarked(self) -> bool {
        matches!(self, Self::Added)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_from_none() {
        let plan = TogglePlan::new(VoteState::None, Polarity::Up);
        assert_eq!(plan.after, VoteState::Up);
        assert_eq!(plan.mutations, vec![VoteMutation::Insert(Polarity::Up)]);
        assert_eq!(plan.transition(), VoteTransition::Cast);

        let plan = TogglePlan::new(VoteState::None, Polarity::Down);
        assert_eq!(plan.after, VoteState::Down);
        assert_eq!(plan.mutations, vec![VoteMutation::Insert(Polarity::Down)]);
    }

    #[test]
    fn test_retract_same_polarity() {
        let plan = TogglePlan::new(VoteState::Up, Polarity::Up);
        assert_eq!(plan.after, VoteState::None);
        assert_eq!(plan.mutations, vec![VoteMutation::Delete(Polarity::Up)]);
        assert_eq!(plan.transition(), VoteTransition::Retract);

        let plan = TogglePlan::new(VoteState::Down, Polarity::Down);
        assert_eq!(plan.after, VoteState::None);
        assert_eq!(plan.mutations, vec![VoteMutation::Delete(Polarity::Down)]);
    }

    #[test]
    fn test_switch_deletes_before_insert() {
        let plan = TogglePlan::new(VoteState::Up, Polarity::Down);
        assert_eq!(plan.after, VoteState::Down);
        assert_eq!(
            plan.mutations,
            vec![
                VoteMutation::Delete(Polarity::Up),
                VoteMutation::Insert(Polarity::Down)
            ]
        );
        assert_eq!(plan.transition(), VoteTransition::Switch);

        let plan = TogglePlan::new(VoteState::Down, Polarity::Up);
        assert_eq!(plan.after, VoteState::Up);
        assert_eq!(
            plan.mutations,
            vec![
                VoteMutation::Delete(Polarity::Down),
                VoteMutation::Insert(Polarity::Up)
            ]
        );
    }

    #[test]
    fn test_same_polarity_cycle_length_two() {
        let mut state = VoteState::None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            state = TogglePlan::new(state, Polarity::Down).after;
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![VoteState::Down, VoteState::None, VoteState::Down, VoteState::None]
        );
    }

    #[test]
    fn test_every_plan_inserts_at_most_once() {
        let states = [VoteState::None, VoteState::Up, VoteState::Down];
        let requests = [Polarity::Up, Polarity::Down];
        for existing in states {
            for requested in requests {
                let plan = TogglePlan::new(existing, requested);
                let inserts = plan
                    .mutations
                    .iter()
                    .filter(|m| matches!(m, VoteMutation::Insert(_)))
                    .count();
                assert!(inserts <= 1, "{existing:?} + {requested:?}");
                assert_eq!(plan.before, existing);
            }
        }
    }

    #[test]
    fn test_bookmark_change_flips_membership() {
        assert_eq!(BookmarkChange::new(false), BookmarkChange::Added);
        assert_eq!(BookmarkChange::new(true), BookmarkChange::Removed);
        assert!(BookmarkChange::Added.is_bookmarked());
        assert!(!BookmarkChange::new(BookmarkChange::Added.is_bookmarked()).is_bookmarked());
    }
}
