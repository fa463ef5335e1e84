//! 回答 API 处理器
//!
//! 创建回答时在同一事务内记录 answer_created 行为，供推荐使用

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use forum_shared::observability::metrics;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    dto::{
        AnswerDto, AnswerVoteRequest, ApiResponse, AuthorDto, CreateAnswerRequest,
        CreatedResponse, ListQuery, PageResponse, UpdateAnswerRequest,
    },
    error::{ForumError, Result},
    models::{AnswerFilter, InteractionAction, Polarity, VoteTarget},
    repository::InteractionRepository,
    state::AppState,
};

/// 回答列表默认每页条数
const DEFAULT_PAGE_SIZE: i64 = 10;

/// 回答查询（不含 WHERE / ORDER BY）
const ANSWER_SQL: &str = r#"
    SELECT
        a.id,
        a.question_id,
        a.content,
        a.created_at,
        a.updated_at,
        u.id AS author_id,
        u.name AS author_name,
        u.picture AS author_picture,
        (SELECT COUNT(*) FROM answer_votes v WHERE v.answer_id = a.id AND v.polarity = 'up') AS upvotes,
        (SELECT COUNT(*) FROM answer_votes v WHERE v.answer_id = a.id AND v.polarity = 'down') AS downvotes
    FROM answers a
    JOIN users u ON u.id = a.author_id
"#;

#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: Uuid,
    question_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    author_name: String,
    author_picture: Option<String>,
    upvotes: i64,
    downvotes: i64,
}

impl From<AnswerRow> for AnswerDto {
    fn from(row: AnswerRow) -> Self {
        Self {
            id: row.id,
            question_id: row.question_id,
            content: row.content,
            author: AuthorDto {
                id: row.author_id,
                name: row.author_name,
                picture: row.author_picture,
            },
            upvotes: row.upvotes,
            downvotes: row.downvotes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 问题下的全部回答（问题详情使用）
pub(crate) async fn answers_for_question(
    pool: &PgPool,
    question_id: Uuid,
    filter: AnswerFilter,
) -> Result<Vec<AnswerDto>> {
    let rows = sqlx::query_as::<_, AnswerRow>(&format!(
        "{} WHERE a.question_id = $1 ORDER BY {}",
        ANSWER_SQL,
        filter.order_by()
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AnswerDto::from).collect())
}

/// 校验回答存在且当前用户是作者
async fn ensure_answer_author(pool: &PgPool, id: Uuid, user: &CurrentUser) -> Result<()> {
    let author: Option<(Uuid,)> = sqlx::query_as("SELECT author_id FROM answers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match author {
        None => Err(ForumError::AnswerNotFound(id)),
        Some((author_id,)) if author_id != user.id => {
            Err(ForumError::Forbidden("只能修改自己的回答".to_string()))
        }
        Some(_) => Ok(()),
    }
}

/// 创建回答
///
/// POST /api/v1/answers
pub async fn create_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateAnswerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>)> {
    req.validate()?;
    user.ensure_is(req.author)?;

    let mut tx = state.pool.begin().await?;

    // 问题在事务提交前不能被删除
    let question: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM questions WHERE id = $1 FOR KEY SHARE")
            .bind(req.question_id)
            .fetch_optional(&mut *tx)
            .await?;
    if question.is_none() {
        return Err(ForumError::QuestionNotFound(req.question_id));
    }

    let answer_id = Uuid::now_v7();
    sqlx::query(
        r#"
        INSERT INTO answers (id, question_id, author_id, content)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(answer_id)
    .bind(req.question_id)
    .bind(user.id)
    .bind(&req.content)
    .execute(&mut *tx)
    .await?;

    InteractionRepository::log_in_tx(
        &mut tx,
        user.id,
        InteractionAction::AnswerCreated,
        req.question_id,
        Some(answer_id),
    )
    .await?;

    tx.commit().await?;

    metrics::record_answer_created();
    info!(%answer_id, question_id = %req.question_id, "Answer created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id: answer_id })),
    ))
}

/// 问题下的回答列表
///
/// GET /api/v1/questions/{id}/answers
pub async fn list_answers(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<AnswerDto>>>> {
    let filter = AnswerFilter::parse(query.filter());
    let limit = query.limit(DEFAULT_PAGE_SIZE);
    let offset = query.offset(DEFAULT_PAGE_SIZE);

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM answers WHERE question_id = $1")
        .bind(question_id)
        .fetch_one(&state.pool)
        .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            limit,
        ))));
    }

    let rows = sqlx::query_as::<_, AnswerRow>(&format!(
        "{} WHERE a.question_id = $1 ORDER BY {} LIMIT $2 OFFSET $3",
        ANSWER_SQL,
        filter.order_by()
    ))
    .bind(question_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let items = rows.into_iter().map(AnswerDto::from).collect();
    Ok(Json(ApiResponse::success(PageResponse::new(
        items,
        total.0,
        query.page(),
        limit,
    ))))
}

/// 回答详情
///
/// GET /api/v1/answers/{id}
pub async fn get_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnswerDto>>> {
    let row = sqlx::query_as::<_, AnswerRow>(&format!("{} WHERE a.id = $1", ANSWER_SQL))
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ForumError::AnswerNotFound(id))?;

    Ok(Json(ApiResponse::success(row.into())))
}

/// 更新回答
///
/// PATCH /api/v1/answers/{id}
pub async fn update_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAnswerRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;
    ensure_answer_author(&state.pool, id, &user).await?;

    sqlx::query("UPDATE answers SET content = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(&req.content)
        .execute(&state.pool)
        .await?;

    info!(answer_id = %id, "Answer updated");

    Ok(Json(ApiResponse::<()>::message("回答已更新")))
}

/// 删除回答
///
/// DELETE /api/v1/answers/{id}
pub async fn delete_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    ensure_answer_author(&state.pool, id, &user).await?;

    sqlx::query("DELETE FROM answers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    info!(answer_id = %id, "Answer deleted");

    Ok(Json(ApiResponse::<()>::message("回答已删除")))
}

async fn vote_answer(
    state: &AppState,
    user: &CurrentUser,
    req: AnswerVoteRequest,
    polarity: Polarity,
) -> Result<Json<ApiResponse<()>>> {
    state
        .vote_service
        .toggle_vote(
            user,
            req.user_id,
            VoteTarget::Answer,
            req.question_answered_id,
            polarity,
        )
        .await?;

    Ok(Json(ApiResponse::<()>::message("投票已更新")))
}

/// 赞成回答（再次请求则撤销）
///
/// POST /api/v1/answers/upvotes
pub async fn upvote_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AnswerVoteRequest>,
) -> Result<Json<ApiResponse<()>>> {
    vote_answer(&state, &user, req, Polarity::Up).await
}

/// 反对回答（再次请求则撤销）
///
/// POST /api/v1/answers/downvotes
pub async fn downvote_answer(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AnswerVoteRequest>,
) -> Result<Json<ApiResponse<()>>> {
    vote_answer(&state, &user, req, Polarity::Down).await
}
