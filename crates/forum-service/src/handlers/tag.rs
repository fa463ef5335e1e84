//! 标签 API 处理器

use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    dto::{ApiResponse, ListQuery, PageResponse, QuestionSummaryDto, TagDetailDto, TagDto},
    error::{ForumError, Result},
    models::TagFilter,
    repository::{QUESTION_SUMMARY_SQL, QuestionRepository, QuestionSummaryRow},
    state::AppState,
};

/// 标签列表默认每页条数
const DEFAULT_PAGE_SIZE: i64 = 8;
/// 标签详情中问题列表默认每页条数
const QUESTION_PAGE_SIZE: i64 = 5;

const TAG_SQL: &str = r#"
    SELECT
        t.id,
        t.name,
        t.description,
        t.created_at,
        (SELECT COUNT(*) FROM question_tags qt WHERE qt.tag_id = t.id) AS question_count
    FROM tags t
"#;

/// 标签下问题的查询条件：$1 标签，$2 搜索模式
const TAG_QUESTIONS_WHERE: &str = r#"
    WHERE EXISTS (
            SELECT 1 FROM question_tags qt
            WHERE qt.question_id = q.id AND qt.tag_id = $1
          )
      AND ($2::text IS NULL OR q.title ILIKE $2 ESCAPE '\' OR q.content ILIKE $2 ESCAPE '\')
"#;

/// 标签列表
///
/// GET /api/v1/tags
pub async fn list_tags(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<TagDto>>>> {
    let filter = TagFilter::parse(query.filter());
    let search = query.search_pattern();
    let limit = query.limit(DEFAULT_PAGE_SIZE);
    let offset = query.offset(DEFAULT_PAGE_SIZE);

    let total: (i64,) =
        sqlx::query_as(r"SELECT COUNT(*) FROM tags t WHERE ($1::text IS NULL OR t.name ILIKE $1 ESCAPE '\')")
            .bind(&search)
            .fetch_one(&state.pool)
            .await?;

    if total.0 == 0 {
        return Ok(Json(ApiResponse::success(PageResponse::empty(
            query.page(),
            limit,
        ))));
    }

    let items = sqlx::query_as::<_, TagDto>(&format!(
        r"{} WHERE ($1::text IS NULL OR t.name ILIKE $1 ESCAPE '\') ORDER BY {} LIMIT $2 OFFSET $3",
        TAG_SQL,
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

/// 标签详情及其下的问题
///
/// GET /api/v1/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<TagDetailDto>>> {
    let tag = sqlx::query_as::<_, TagDto>(&format!("{} WHERE t.id = $1", TAG_SQL))
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ForumError::TagNotFound(id))?;

    let search = query.search_pattern();
    let limit = query.limit(QUESTION_PAGE_SIZE);
    let offset = query.offset(QUESTION_PAGE_SIZE);

    let total: (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM questions q {}",
        TAG_QUESTIONS_WHERE
    ))
    .bind(id)
    .bind(&search)
    .fetch_one(&state.pool)
    .await?;

    let questions: PageResponse<QuestionSummaryDto> = if total.0 == 0 {
        PageResponse::empty(query.page(), limit)
    } else {
        let rows = sqlx::query_as::<_, QuestionSummaryRow>(&format!(
            "{} {} ORDER BY q.created_at DESC LIMIT $3 OFFSET $4",
            QUESTION_SUMMARY_SQL, TAG_QUESTIONS_WHERE
        ))
        .bind(id)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

        let items = QuestionRepository::with_tags(&state.pool, rows).await?;
        PageResponse::new(items, total.0, query.page(), limit)
    };

    Ok(Json(ApiResponse::success(TagDetailDto { tag, questions })))
}

/// 问题数最多的 5 个标签
///
/// GET /api/v1/top-5-tags
pub async fn top_tags(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<TagDto>>>> {
    let tags = sqlx::query_as::<_, TagDto>(&format!(
        "{} ORDER BY question_count DESC, t.name ASC LIMIT 5",
        TAG_SQL
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(tags)))
}
