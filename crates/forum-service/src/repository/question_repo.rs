//! 问题仓储
//!
//! 问题列表项的公共查询片段、标签批量加载，以及建问题时的标签查找/创建。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::{AuthorDto, QuestionSummaryDto, TagRef};
use crate::error::Result;

/// 问题列表项查询（不含 WHERE / ORDER BY）
///
/// 赞成/反对数与回答数在读取时统计，不做冗余计数。
pub const QUESTION_SUMMARY_SQL: &str = r#"
    SELECT
        q.id,
        q.title,
        q.content,
        q.views,
        q.created_at,
        u.id AS author_id,
        u.name AS author_name,
        u.picture AS author_picture,
        (SELECT COUNT(*) FROM question_votes v WHERE v.question_id = q.id AND v.polarity = 'up') AS upvotes,
        (SELECT COUNT(*) FROM question_votes v WHERE v.question_id = q.id AND v.polarity = 'down') AS downvotes,
        (SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id) AS answer_count
    FROM questions q
    JOIN users u ON u.id = q.author_id
"#;

/// 问题列表项查询结果行
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_picture: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub answer_count: i64,
}

impl QuestionSummaryRow {
    fn into_dto(self, tags: Vec<TagRef>) -> QuestionSummaryDto {
        QuestionSummaryDto {
            id: self.id,
            title: self.title,
            content: self.content,
            tags,
            author: AuthorDto {
                id: self.author_id,
                name: self.author_name,
                picture: self.author_picture,
            },
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            answer_count: self.answer_count,
            views: self.views,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QuestionTagRow {
    question_id: Uuid,
    id: Uuid,
    name: String,
}

/// 问题仓储
pub struct QuestionRepository;

impl QuestionRepository {
    /// 批量加载问题的标签
    pub async fn tags_for_questions(
        pool: &PgPool,
        question_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<TagRef>>> {
        if question_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, QuestionTagRow>(
            r#"
            SELECT qt.question_id, t.id, t.name
            FROM question_tags qt
            JOIN tags t ON t.id = qt.tag_id
            WHERE qt.question_id = ANY($1)
            ORDER BY t.name ASC
            "#,
        )
        .bind(question_ids)
        .fetch_all(pool)
        .await?;

        let mut tags: HashMap<Uuid, Vec<TagRef>> = HashMap::new();
        for row in rows {
            tags.entry(row.question_id).or_default().push(TagRef {
                id: row.id,
                name: row.name,
            });
        }
        Ok(tags)
    }

    /// 为查询结果行附加标签，保持原有顺序
    pub async fn with_tags(
        pool: &PgPool,
        rows: Vec<QuestionSummaryRow>,
    ) -> Result<Vec<QuestionSummaryDto>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut tags = Self::tags_for_questions(pool, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let row_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_dto(row_tags)
            })
            .collect())
    }

    /// 查找或创建标签（名称大小写不敏感），返回去重后的标签
    pub async fn find_or_create_tags_in_tx(
        conn: &mut PgConnection,
        names: &[String],
    ) -> Result<Vec<TagRef>> {
        let mut tags: Vec<TagRef> = Vec::with_capacity(names.len());

        for name in normalize_tag_names(names) {
            let tag = sqlx::query_as::<_, TagRef>(
                r#"
                INSERT INTO tags (id, name)
                VALUES ($1, $2)
                ON CONFLICT ((LOWER(name))) DO UPDATE SET name = tags.name
                RETURNING id, name
                "#,
            )
            .bind(Uuid::now_v7())
            .bind(&name)
            .fetch_one(&mut *conn)
            .await?;

            if !tags.iter().any(|t| t.id == tag.id) {
                tags.push(tag);
            }
        }

        Ok(tags)
    }

    /// 关联问题与标签
    pub async fn link_tags_in_tx(
        conn: &mut PgConnection,
        question_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO question_tags (question_id, tag_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(question_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

/// 去除首尾空白并按小写去重，保留首次出现的写法
pub fn normalize_tag_names(names: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    let mut result = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            result.push(trimmed.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag_names_dedupes_case_insensitively() {
        let names = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "Tokio".to_string(),
            "".to_string(),
            "RUST".to_string(),
        ];
        assert_eq!(normalize_tag_names(&names), vec!["Rust", "Tokio"]);
    }

    #[test]
    fn test_summary_row_into_dto() {
        let row = QuestionSummaryRow {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            views: 3,
            created_at: Utc::now(),
            author_id: Uuid::new_v4(),
            author_name: "Alice".into(),
            author_picture: None,
            upvotes: 2,
            downvotes: 1,
            answer_count: 4,
        };
        let author_id = row.author_id;
        let dto = row.into_dto(vec![]);
        assert_eq!(dto.author.id, author_id);
        assert_eq!(dto.upvotes, 2);
        assert_eq!(dto.answer_count, 4);
    }
}
