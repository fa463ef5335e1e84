//! 问题 API 处理器
//!
//! 问题的增删改查、浏览计数、投票与收藏切换、收藏列表和推荐

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

use super::answer::answers_for_question;
use crate::{
    auth::CurrentUser,
    dto::{
        ApiResponse, AuthorDto, CreateQuestionRequest, CreatedResponse, ListQuery, PageResponse,
        QuestionActionRequest, QuestionDetailDto, QuestionSummaryDto, TopQuestionDto,
        UpdateQuestionRequest, ViewCountDto,
    },
    error::{ForumError, Result},
    models::{
        AnswerFilter, BookmarkFilter, InteractionAction, Polarity, QuestionFilter, VoteTarget,
    },
    repository::{InteractionRepository, QUESTION_SUMMARY_SQL, QuestionRepository, QuestionSummaryRow},
    state::AppState,
};

/// 问题列表默认每页条数
const DEFAULT_PAGE_SIZE: i64 = 10;
/// 收藏列表默认每页条数
const BOOKMARK_PAGE_SIZE: i64 = 5;
/// 提问奖励的声望
const QUESTION_REPUTATION: i32 = 5;

/// 问题列表查询条件：$1 搜索模式，$2 仅未回答
const QUESTION_LIST_WHERE: &str = r#"
    WHERE ($1::text IS NULL OR q.title ILIKE $1 ESCAPE '\' OR q.content ILIKE $1 ESCAPE '\')
      AND ($2::bool = FALSE OR NOT EXISTS (SELECT 1 FROM answers a WHERE a.question_id = q.id))
"#;

/// 收藏列表查询条件：$1 用户，$2 搜索模式
const BOOKMARK_WHERE: &str = r#"
    WHERE EXISTS (
            SELECT 1 FROM question_bookmarks b
            WHERE b.question_id = q.id AND b.user_id = $1
          )
      AND ($2::text IS NULL OR q.title ILIKE $2 ESCAPE '\' OR q.content ILIKE $2 ESCAPE '\')
"#;

#[derive(sqlx::FromRow)]
struct QuestionDetailRow {
    id: Uuid,
    title: String,
    content: String,
    views: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    author_name: String,
    author_picture: Option<String>,
}

/// 校验问题存在且当前用户是作者
async fn ensure_question_author(pool: &PgPool, id: Uuid, user: &CurrentUser) -> Result<()> {
    let author: Option<(Uuid,)> = sqlx::query_as("SELECT author_id FROM questions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match author {
        None => Err(ForumError::QuestionNotFound(id)),
        Some((author_id,)) if author_id != user.id => {
            Err(ForumError::Forbidden("只能修改自己的问题".to_string()))
        }
        Some(_) => Ok(()),
    }
}

/// 创建问题
///
/// POST /api/v1/questions
///
/// 问题、标签、标签关联、行为记录与作者声望在同一事务内完成
pub async fn create_question(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>)> {
    req.validate()?;
    user.ensure_is(req.author)?;

    let mut tx = state.pool.begin().await?;

    let question_id = Uuid::now_v7();
    sqlx::query(
        r#"
        INSERT INTO questions (id, title, content, author_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(question_id)
    .bind(req.title.trim())
    .bind(&req.content)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    let tags = QuestionRepository::find_or_create_tags_in_tx(&mut tx, &req.tags).await?;
    let tag_ids: Vec<Uuid> = tags.iter().map(|t| t.id).collect();
    QuestionRepository::link_tags_in_tx(&mut tx, question_id, &tag_ids).await?;

    InteractionRepository::log_in_tx(
        &mut tx,
        user.id,
        InteractionAction::QuestionCreated,
        question_id,
        None,
    )
    .await?;

    sqlx::query("UPDATE users SET reputation = reputation + $2 WHERE id = $1")
        .bind(user.id)
        .bind(QUESTION_REPUTATION)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    metrics::record_question_created(tags.len());
    info!(%question_id, tag_count = tags.len(), "Question created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedResponse { id: question_id })),
    ))
}

/// 问题列表
///
/// GET /api/v1/questions
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<QuestionSummaryDto>>>> {
    let filter = QuestionFilter::parse(query.filter());
    let search = query.search_pattern();
    let limit = query.limit(DEFAULT_PAGE_SIZE);
    let offset = query.offset(DEFAULT_PAGE_SIZE);

    let total: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM questions q {}",
        QUESTION_LIST_WHERE
    ))
    .bind(&search)
    .bind(filter.unanswered_only())
    .fetch_one(&state.pool)
    .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            limit,
        ))));
    }

    let rows = sqlx::query_as::<_, QuestionSummaryRow>(&format!(
        "{} {} ORDER BY {} LIMIT $3 OFFSET $4",
        QUESTION_SUMMARY_SQL,
        QUESTION_LIST_WHERE,
        filter.order_by()
    ))
    .bind(&search)
    .bind(filter.unanswered_only())
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

/// 问题详情
///
/// GET /api/v1/questions/{id}
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuestionDetailDto>>> {
    let row = sqlx::query_as::<_, QuestionDetailRow>(
        r#"
        SELECT
            q.id, q.title, q.content, q.views, q.created_at, q.updated_at,
            u.id AS author_id, u.name AS author_name, u.picture AS author_picture
        FROM questions q
        JOIN users u ON u.id = q.author_id
        WHERE q.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ForumError::QuestionNotFound(id))?;

    let votes_query = sqlx::query_as::<_, (Uuid, Polarity)>(
        "SELECT user_id, polarity FROM question_votes WHERE question_id = $1",
    )
    .bind(id)
    .fetch_all(&state.pool);
    let bookmarks_query = sqlx::query_as::<_, (Uuid,)>(
        "SELECT user_id FROM question_bookmarks WHERE question_id = $1",
    )
    .bind(id)
    .fetch_all(&state.pool);

    let ids = [id];
    let (mut tags, votes, bookmarks, answers) = futures::try_join!(
        QuestionRepository::tags_for_questions(&state.pool, &ids),
        async { votes_query.await.map_err(ForumError::from) },
        async { bookmarks_query.await.map_err(ForumError::from) },
        answers_for_question(&state.pool, id, AnswerFilter::default()),
    )?;

    let (upvoters, downvoters): (Vec<_>, Vec<_>) =
        votes.into_iter().partition(|(_, p)| *p == Polarity::Up);

    let dto = QuestionDetailDto {
        id: row.id,
        title: row.title,
        content: row.content,
        tags: tags.remove(&id).unwrap_or_default(),
        author: AuthorDto {
            id: row.author_id,
            name: row.author_name,
            picture: row.author_picture,
        },
        views: row.views,
        upvoters: upvoters.into_iter().map(|(uid, _)| uid).collect(),
        downvoters: downvoters.into_iter().map(|(uid, _)| uid).collect(),
        bookmarked_by: bookmarks.into_iter().map(|(uid,)| uid).collect(),
        answers,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };

    Ok(Json(ApiResponse::success(dto)))
}

/// 更新问题
///
/// PATCH /api/v1/questions/{id}
pub async fn update_question(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateQuestionRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;
    ensure_question_author(&state.pool, id, &user).await?;

    sqlx::query(
        r#"
        UPDATE questions
        SET title = COALESCE($2, title),
            content = COALESCE($3, content),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(&req.content)
    .execute(&state.pool)
    .await?;

    info!(question_id = %id, "Question updated");

    Ok(Json(ApiResponse::<()>::message("问题已更新")))
}

/// 删除问题，回答、投票、收藏和行为记录级联删除
///
/// DELETE /api/v1/questions/{id}
pub async fn delete_question(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    ensure_question_author(&state.pool, id, &user).await?;

    sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    info!(question_id = %id, "Question deleted");

    Ok(Json(ApiResponse::<()>::message("问题已删除")))
}

/// 浏览量加一
///
/// POST /api/v1/questions/views/{id}
pub async fn increment_views(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ViewCountDto>>> {
    let views: (i32,) =
        sqlx::query_as("UPDATE questions SET views = views + 1 WHERE id = $1 RETURNING views")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or(ForumError::QuestionNotFound(id))?;

    Ok(Json(ApiResponse::success(ViewCountDto { id, views: views.0 })))
}

/// 热门问题
///
/// GET /api/v1/top-5-questions
pub async fn top_questions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TopQuestionDto>>>> {
    let rows = sqlx::query_as::<_, TopQuestionDto>(
        r#"
        SELECT
            q.id,
            q.title,
            q.views,
            (SELECT COUNT(*) FROM question_votes v WHERE v.question_id = q.id AND v.polarity = 'up') AS upvotes
        FROM questions q
        ORDER BY q.views DESC, upvotes DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(rows)))
}

async fn vote_question(
    state: &AppState,
    user: &CurrentUser,
    req: QuestionActionRequest,
    polarity: Polarity,
) -> Result<Json<ApiResponse<()>>> {
    state
        .vote_service
        .toggle_vote(user, req.user_id, VoteTarget::Question, req.question_id, polarity)
        .await?;

    Ok(Json(ApiResponse::<()>::message("投票已更新")))
}

/// 赞成问题（再次请求则撤销）
///
/// POST /api/v1/questions/upvotes
pub async fn upvote_question(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<QuestionActionRequest>,
) -> Result<Json<ApiResponse<()>>> {
    vote_question(&state, &user, req, Polarity::Up).await
}

/// 反对问题（再次请求则撤销）
///
/// POST /api/v1/questions/downvotes
pub async fn downvote_question(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<QuestionActionRequest>,
) -> Result<Json<ApiResponse<()>>> {
    vote_question(&state, &user, req, Polarity::Down).await
}

/// 收藏 / 取消收藏
///
/// POST /api/v1/questions/bookmark
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<QuestionActionRequest>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .vote_service
        .toggle_bookmark(&user, req.user_id, req.question_id)
        .await?;

    Ok(Json(ApiResponse::<()>::message("收藏已更新")))
}

/// 当前用户的收藏列表
///
/// GET /api/v1/questions/bookmark
pub async fn list_bookmarks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<QuestionSummaryDto>>>> {
    let filter = BookmarkFilter::parse(query.filter());
    let search = query.search_pattern();
    let limit = query.limit(BOOKMARK_PAGE_SIZE);
    let offset = query.offset(BOOKMARK_PAGE_SIZE);

    let total: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM questions q {}",
        BOOKMARK_WHERE
    ))
    .bind(user.id)
    .bind(&search)
    .fetch_one(&state.pool)
    .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            limit,
        ))));
    }

    let rows = sqlx::query_as::<_, QuestionSummaryRow>(&format!(
        "{} {} ORDER BY {} LIMIT $3 OFFSET $4",
        QUESTION_SUMMARY_SQL,
        BOOKMARK_WHERE,
        filter.order_by()
    ))
    .bind(user.id)
    .bind(&search)
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

/// 为当前用户推荐问题
///
/// GET /api/v1/questions/recommended
pub async fn recommended_questions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<QuestionSummaryDto>>>> {
    let page = state
        .recommendation_service
        .recommend(user.id, &query)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}
