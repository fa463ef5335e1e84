//! 中间件模块

mod auth;

pub use auth::{AUTH_COOKIE, auth_middleware, extract_token};
