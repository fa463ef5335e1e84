//! HTTP 请求处理器模块
//!
//! 包含所有 REST API 端点的处理器实现

pub mod answer;
pub mod auth;
pub mod question;
pub mod search;
pub mod tag;
pub mod user;
