//! 问答论坛服务
//!
//! 提供提问、回答、标签、用户、全局搜索等 REST API。
//!
//! ## 核心功能
//!
//! - **投票切换**：赞成/反对互斥，同一用户对同一对象至多一条投票记录，
//!   切换在单个事务内先删后插
//! - **收藏切换**：存在则删除，否则创建
//! - **推荐**：根据用户提问/回答时关联过的标签推荐问题，无行为时回退到近期热门
//!
//! ## 模块结构
//!
//! - `auth`: JWT 与密码处理
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证中间件
//! - `models`: 领域枚举、投票切换计划、推荐范围
//! - `repository`: 数据库仓储
//! - `routes`: 路由配置
//! - `service`: 投票与推荐服务
//! - `state`: 应用状态

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

pub use dto::{ApiResponse, ListQuery, PageResponse};
pub use error::{ForumError, Result, set_verbose_errors};
pub use models::{BookmarkChange, Polarity, TogglePlan, VoteState, VoteTarget};
