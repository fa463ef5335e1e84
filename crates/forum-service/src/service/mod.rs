//! 业务服务层
//!
//! - `vote_service`: 投票与收藏切换
//! - `recommendation_service`: 基于标签行为的问题推荐

mod recommendation_service;
mod vote_service;

pub use recommendation_service::RecommendationService;
pub use vote_service::VoteService;
