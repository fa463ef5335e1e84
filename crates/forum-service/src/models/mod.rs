//! 论坛领域模型
//!
//! - `enums`: 投票方向、行为类型、列表排序
//! - `vote`: 投票/收藏切换规则
//! - `recommendation`: 推荐范围

mod enums;
mod recommendation;
mod vote;

pub use enums::*;
pub use recommendation::*;
pub use vote::*;
