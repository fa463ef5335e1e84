//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use forum_shared::config::AppConfig;
use sqlx::PgPool;

use crate::auth::{JwtConfig, JwtManager};
use crate::middleware::AUTH_COOKIE;
use crate::repository::{InteractionRepository, VoteRepository};
use crate::service::{RecommendationService, VoteService};

/// auth_token Cookie 设置
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// 仅在 HTTPS 下发送（生产环境开启）
    pub secure: bool,
    pub max_age_days: i64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            max_age_days: 30,
        }
    }
}

impl CookieSettings {
    /// 携带 Token 的 HttpOnly Cookie
    pub fn auth_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(self.max_age_days))
            .build()
    }

    /// 立即过期的 Cookie，用于登出
    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

/// Axum 应用共享状态
///
/// 连接池和各服务通过 Arc 在 handler 间共享
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    pub jwt_manager: Arc<JwtManager>,
    pub cookie: CookieSettings,
    pub vote_service: Arc<VoteService>,
    pub recommendation_service: Arc<RecommendationService>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, jwt_config: JwtConfig, cookie: CookieSettings) -> Self {
        let vote_service = Arc::new(VoteService::new(Arc::new(VoteRepository::new(pool.clone()))));
        let recommendation_service = Arc::new(RecommendationService::new(Arc::new(
            InteractionRepository::new(pool.clone()),
        )));

        Self {
            pool,
            jwt_manager: Arc::new(JwtManager::new(jwt_config)),
            cookie,
            vote_service,
            recommendation_service,
        }
    }

    /// 由应用配置构造
    pub fn from_config(pool: PgPool, config: &AppConfig) -> Self {
        let cookie = CookieSettings {
            secure: config.is_production(),
            max_age_days: config.auth.cookie_expires_in_days,
        };
        Self::new(pool, JwtConfig::from(&config.auth), cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie_attributes() {
        let settings = CookieSettings {
            secure: true,
            max_age_days: 30,
        };
        let cookie = settings.auth_cookie("abc".to_string());

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = CookieSettings::default().expired_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(false));
    }
}
