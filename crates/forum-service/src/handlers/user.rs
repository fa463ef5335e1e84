//! 用户 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::auth::{USER_COLUMNS, load_user};
use crate::{
    auth::CurrentUser,
    dto::{
        ApiResponse, ListQuery, PageResponse, QuestionSummaryDto, UpdateProfileRequest, UserDto,
        UserProfileDto, UserStatsDto, UserTagDto,
    },
    error::{ForumError, Result},
    models::UserFilter,
    repository::{QUESTION_SUMMARY_SQL, QuestionRepository, QuestionSummaryRow},
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 10;

const USER_SEARCH_WHERE: &str = r#"
    WHERE ($1::text IS NULL OR u.name ILIKE $1 ESCAPE '\' OR u.username ILIKE $1 ESCAPE '\' OR u.email ILIKE $1 ESCAPE '\')
"#;

/// 用户列表
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<UserDto>>>> {
    let filter = UserFilter::parse(query.filter());
    let search = query.search_pattern();
    let limit = query.limit(DEFAULT_PAGE_SIZE);
    let offset = query.offset(DEFAULT_PAGE_SIZE);

    let total: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM users u {}",
        USER_SEARCH_WHERE
    ))
    .bind(&search)
    .fetch_one(&state.pool)
    .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            limit,
        ))));
    }

    let items = sqlx::query_as::<_, UserDto>(&format!(
        "SELECT {} FROM users u {} ORDER BY {} LIMIT $2 OFFSET $3",
        USER_COLUMNS,
        USER_SEARCH_WHERE,
        filter.order_by()
    ))
    .bind(&search)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(PageResponse::new(
        items,
        total.0,
        query.page(),
        limit,
    ))))
}

/// 用户主页
///
/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserProfileDto>>> {
    let user = load_user(&state, id).await?;

    let counts: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM questions WHERE author_id = $1),
            (SELECT COUNT(*) FROM answers WHERE author_id = $1)
        "#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(UserProfileDto {
        user,
        question_count: counts.0,
        answer_count: counts.1,
    })))
}

/// 更新个人资料（仅本人）
///
/// PATCH /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDto>>> {
    req.validate()?;
    current.ensure_is(id)?;

    let user = sqlx::query_as::<_, UserDto>(&format!(
        r#"
        UPDATE users
        SET name = $2,
            username = $3,
            email = $4,
            bio = $5,
            location = $6,
            portfolio_website = $7,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(id)
    .bind(req.name.trim())
    .bind(&req.username)
    .bind(req.email.trim())
    .bind(&req.bio)
    .bind(&req.location)
    .bind(&req.portfolio_website)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ForumError::UserNotFound(id))?;

    info!(user_id = %id, "Profile updated");

    Ok(Json(ApiResponse::success(user)))
}

/// 用户提出的问题
///
/// GET /api/v1/users/{id}/questions
pub async fn user_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<QuestionSummaryDto>>>> {
    let limit = query.limit(DEFAULT_PAGE_SIZE);
    let offset = query.offset(DEFAULT_PAGE_SIZE);

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE author_id = $1")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            limit,
        ))));
    }

    let rows = sqlx::query_as::<_, QuestionSummaryRow>(&format!(
        "{} WHERE q.author_id = $1 ORDER BY q.views DESC, q.created_at DESC LIMIT $2 OFFSET $3",
        QUESTION_SUMMARY_SQL
    ))
    .bind(id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let items = QuestionRepository::with_tags(&state.pool, rows).await?;
    Ok(Json(ApiResponse::success(PageResponse::new(
        items,
        total.0,
        query.page(),
        limit,
    ))))
}

/// 用户最常用的 5 个标签
///
/// GET /api/v1/users/{id}/tags
pub async fn user_top_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<UserTagDto>>>> {
    let tags = sqlx::query_as::<_, UserTagDto>(
        r#"
        SELECT t.id, t.name, COUNT(*) AS count
        FROM questions q
        JOIN question_tags qt ON qt.question_id = q.id
        JOIN tags t ON t.id = qt.tag_id
        WHERE q.author_id = $1
        GROUP BY t.id, t.name
        ORDER BY count DESC, t.name ASC
        LIMIT 5
        "#,
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(tags)))
}

/// 用户统计
///
/// GET /api/v1/users/{id}/stats
pub async fn user_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserStatsDto>>> {
    let stats = sqlx::query_as::<_, UserStatsDto>(
        r#"
        SELECT
            u.reputation,
            (SELECT COUNT(*) FROM questions q WHERE q.author_id = u.id) AS question_count,
            (SELECT COUNT(*) FROM answers a WHERE a.author_id = u.id) AS answer_count,
            (SELECT COUNT(*) FROM question_votes v
                JOIN questions q ON q.id = v.question_id
                WHERE q.author_id = u.id AND v.polarity = 'up') AS question_upvotes,
            (SELECT COUNT(*) FROM answer_votes v
                JOIN answers a ON a.id = v.answer_id
                WHERE a.author_id = u.id AND v.polarity = 'up') AS answer_upvotes
        FROM users u
        WHERE u.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ForumError::UserNotFound(id))?;

    Ok(Json(ApiResponse::success(stats)))
}
