//! 全局搜索 API 处理器
//!
//! 指定类型时最多返回 8 条该类型结果，否则每种类型各取 2 条

use axum::{
    Json,
    extract::{Query, State},
};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    dto::{ApiResponse, GlobalSearchQuery, SearchHit, like_pattern},
    error::{ForumError, Result},
    models::SearchType,
    state::AppState,
};

/// 指定类型时的结果条数
const SINGLE_TYPE_LIMIT: i64 = 8;
/// 未指定类型时每种类型的结果条数
const PER_TYPE_LIMIT: i64 = 2;

/// 全局搜索
///
/// GET /api/v1/global-search
pub async fn global_search(
    State(state): State<AppState>,
    Query(params): Query<GlobalSearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchHit>>>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ForumError::Validation("query must be provided".to_string()))?;

    let pattern = like_pattern(query);
    let (kinds, limit) = plan(params.search_type.as_deref());

    let mut hits = Vec::new();
    for kind in kinds {
        let rows = search_kind(&state.pool, kind, &pattern, limit).await?;
        hits.extend(rows.into_iter().map(|(id, title)| to_hit(kind, id, title, query)));
    }

    debug!(hits = hits.len(), "Global search served");

    Ok(Json(ApiResponse::success(hits)))
}

/// 要搜索的类型及每种类型的条数
fn plan(search_type: Option<&str>) -> (Vec<SearchType>, i64) {
    match SearchType::parse(search_type) {
        Some(kind) => (vec![kind], SINGLE_TYPE_LIMIT),
        None => (SearchType::ALL.to_vec(), PER_TYPE_LIMIT),
    }
}

/// 按类型查询 (id, 标题)，回答返回所属问题的 id 与标题
///
/// `pattern` 需已按 [`like_pattern`] 转义
pub async fn search_kind(
    pool: &PgPool,
    kind: SearchType,
    pattern: &str,
    limit: i64,
) -> Result<Vec<(Uuid, String)>> {
    let sql = match kind {
        SearchType::Question => {
            r"SELECT id, title FROM questions WHERE title ILIKE $1 ESCAPE '\' ORDER BY created_at DESC LIMIT $2"
        }
        SearchType::User => {
            r"SELECT id, name FROM users WHERE name ILIKE $1 ESCAPE '\' ORDER BY created_at DESC LIMIT $2"
        }
        // 同一问题下多条回答命中时只保留最新的一条
        SearchType::Answer => {
            r#"
            SELECT id, title
            FROM (
                SELECT DISTINCT ON (q.id) q.id, q.title, a.created_at
                FROM answers a
                JOIN questions q ON q.id = a.question_id
                WHERE a.content ILIKE $1 ESCAPE '\'
                ORDER BY q.id, a.created_at DESC
            ) hits
            ORDER BY created_at DESC
            LIMIT $2
            "#
        }
        SearchType::Tag => {
            r"SELECT id, name FROM tags WHERE name ILIKE $1 ESCAPE '\' ORDER BY name ASC LIMIT $2"
        }
    };

    let rows = sqlx::query_as::<_, (Uuid, String)>(sql)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

fn to_hit(kind: SearchType, id: Uuid, title: String, query: &str) -> SearchHit {
    let title = match kind {
        SearchType::Answer => format!("Answer containing \"{}\" from question: {}", query, title),
        _ => title,
    };
    SearchHit { title, id, kind }
}
