//! Article repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use sikuwat_core::drafts::ArticleDraft;

use super::{count_rows, counted, like_pattern, new_id, DbError, SEARCH_LIMIT};
use crate::models::{Paginated, Pagination};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

impl ArticleInput {
    pub fn from_draft(draft: &ArticleDraft) -> Self {
        Self {
            title: draft.title.as_deref().unwrap_or_default().trim().to_string(),
            content: draft.content.as_deref().unwrap_or_default().trim().to_string(),
            source: optional(&draft.source),
            url: optional(&draft.url),
            image_url: optional(&draft.image_url),
        }
    }
}

/// Blank optional text is stored as NULL
pub(crate) fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct ArticleRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ArticleRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &ArticleInput, created_by: &str) -> Result<Article, DbError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (id, title, content, source, url, image_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, content, source, url, image_url, created_by, created_at, updated_at
            "#,
        )
        .bind(new_id("article"))
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.source)
        .bind(&input.url)
        .bind(&input.image_url)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(article)
    }

    pub async fn list(&self, page: Pagination) -> Result<Paginated<Article>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, source, url, image_url, created_by, created_at, updated_at,
                   COUNT(*) OVER() AS total
            FROM articles
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        let mut listed = Paginated::from_rows(counted(rows)?, page);
        if listed.past_end() {
            listed.total = count_rows(self.pool, "articles").await?;
        }
        Ok(listed)
    }

    pub async fn get(&self, id: &str) -> Result<Article, DbError> {
        sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, source, url, image_url, created_by, created_at, updated_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: &str, input: &ArticleInput) -> Result<Article, DbError> {
        sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = $2, content = $3, source = $4, url = $5, image_url = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, source, url, image_url, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.source)
        .bind(&input.url)
        .bind(&input.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Articles whose title or content contains the keyword (case-insensitive)
    pub async fn search(&self, keyword: &str) -> Result<Vec<Article>, DbError> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, source, url, image_url, created_by, created_at, updated_at
            FROM articles
            WHERE title ILIKE $1 OR content ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(like_pattern(keyword))
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(articles)
    }
}

fn not_found(id: &str) -> DbError {
    DbError::NotFound {
        resource: "article",
        id: id.to_owned(),
    }
}
