//! JWT 认证中间件
//!
//! 从 Bearer Token 或 auth_token Cookie 中读取凭证，校验后确认用户仍存在，
//! 再把 `CurrentUser` 注入请求扩展。只挂在需要登录的路由上。

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::auth::CurrentUser;
use crate::error::ForumError;
use crate::state::AppState;

/// 保存 Token 的 Cookie 名
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(sqlx::FromRow)]
struct AuthUserRow {
    id: uuid::Uuid,
    name: String,
    email: String,
}

/// 认证中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ForumError> {
    let token = extract_token(request.headers(), &jar)
        .ok_or_else(|| ForumError::Unauthorized("缺少认证 Token".to_string()))?;

    let claims = state.jwt_manager.verify_token(&token)?;
    let user_id = claims.user_id()?;

    // Token 有效但用户已被删除时同样视为未登录
    let row = sqlx::query_as::<_, AuthUserRow>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ForumError::Unauthorized("用户不存在".to_string()))?;

    debug!(user_id = %row.id, "Request authenticated");

    request.extensions_mut().insert(CurrentUser {
        id: row.id,
        name: row.name,
        email: row.email,
    });

    Ok(next.run(request).await)
}

/// 读取 Token，Authorization 头优先于 Cookie
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    jar.get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, "cookie-token"));

        assert_eq!(extract_token(&headers, &jar).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_cookie_fallback() {
        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, "cookie-token"));
        assert_eq!(
            extract_token(&HeaderMap::new(), &jar).as_deref(),
            Some("cookie-token")
        );
    }

    #[test]
    fn test_missing_or_malformed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers, &CookieJar::new()).is_none());

        let jar = CookieJar::new().add(Cookie::new(AUTH_COOKIE, ""));
        assert!(extract_token(&HeaderMap::new(), &jar).is_none());
    }
}
