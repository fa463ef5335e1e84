//! 认证 API 处理器
//!
//! 注册、登录、登出、当前用户与修改密码

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{CurrentUser, hash_password, verify_password},
    dto::{ApiResponse, AuthResponse, ChangePasswordRequest, LoginRequest, SignupRequest, UserDto},
    error::{ForumError, Result},
    state::AppState,
};

/// 用户公开字段
pub(crate) const USER_COLUMNS: &str =
    "id, name, username, email, bio, location, portfolio_website, picture, reputation, created_at";

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    password_hash: String,
}

/// 按 id 加载用户公开信息
pub(crate) async fn load_user(state: &AppState, id: Uuid) -> Result<UserDto> {
    sqlx::query_as::<_, UserDto>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ForumError::UserNotFound(id))
}

fn issue_token(state: &AppState, user: &UserDto) -> Result<String> {
    let (token, _) = state
        .jwt_manager
        .generate_token(user.id, &user.name, &user.email)?;
    Ok(token)
}

/// 注册
///
/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<AuthResponse>>)> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, UserDto>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(Uuid::now_v7())
    .bind(req.name.trim())
    .bind(req.email.trim())
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await?;

    let token = issue_token(&state, &user)?;
    let jar = jar.add(state.cookie.auth_cookie(token.clone()));

    info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiResponse::success(AuthResponse { token, user })),
    ))
}

/// 登录
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>)> {
    req.validate()?;

    let credential = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, password_hash FROM users WHERE LOWER(email) = LOWER($1)",
    )
    .bind(req.email.trim())
    .fetch_optional(&state.pool)
    .await?;

    // 用户不存在与密码错误返回同一错误
    let credential = match credential {
        Some(c) if verify_password(&req.password, &c.password_hash)? => c,
        _ => {
            warn!("Login failed");
            return Err(ForumError::InvalidCredentials);
        }
    };

    let user = load_user(&state, credential.id).await?;
    let token = issue_token(&state, &user)?;
    let jar = jar.add(state.cookie.auth_cookie(token.clone()));

    info!(user_id = %user.id, "User logged in");

    Ok((jar, Json(ApiResponse::success(AuthResponse { token, user }))))
}

/// 登出
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    (
        jar.add(state.cookie.expired_cookie()),
        Json(ApiResponse::<()>::message("已退出登录")),
    )
}

/// 当前登录用户
///
/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserDto>>> {
    let user = load_user(&state, current.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// 修改密码
///
/// PATCH /api/v1/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;

    let credential = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, password_hash FROM users WHERE id = $1",
    )
    .bind(current.id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ForumError::UserNotFound(current.id))?;

    if !verify_password(&req.old_password, &credential.password_hash)? {
        return Err(ForumError::InvalidCredentials);
    }

    let password_hash = hash_password(&req.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(credential.id)
        .bind(&password_hash)
        .execute(&state.pool)
        .await?;

    info!(user_id = %current.id, "Password changed");

    Ok(Json(ApiResponse::<()>::message("密码已更新")))
}
