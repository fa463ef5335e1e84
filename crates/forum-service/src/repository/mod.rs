//! 数据库仓储层
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 投票切换计划在仓储事务内执行，计划本身由 `models::vote` 计算
//! - 定义 trait 接口以支持 mock 测试

mod interaction_repo;
#[cfg(test)]
pub(crate) mod memory;
mod question_repo;
mod traits;
mod vote_repo;

pub use interaction_repo::InteractionRepository;
pub use question_repo::{
    QUESTION_SUMMARY_SQL, QuestionRepository, QuestionSummaryRow, normalize_tag_names,
};
pub use traits::*;
pub use vote_repo::VoteRepository;
