//! Farming tip repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use sikuwat_core::drafts::TipDraft;

use super::{count_rows, counted, like_pattern, new_id, DbError, SEARCH_LIMIT};
use crate::models::{Paginated, Pagination};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tip {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TipInput {
    pub title: String,
    pub content: String,
    pub category: String,
}

impl TipInput {
    pub fn from_draft(draft: &TipDraft) -> Self {
        Self {
            title: draft.title.as_deref().unwrap_or_default().trim().to_string(),
            content: draft.content.as_deref().unwrap_or_default().trim().to_string(),
            category: draft.category_or_default(),
        }
    }
}

pub struct TipRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TipRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &TipInput, created_by: &str) -> Result<Tip, DbError> {
        let tip = sqlx::query_as::<_, Tip>(
            r#"
            INSERT INTO tips (id, title, content, category, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, content, category, created_by, created_at, updated_at
            "#,
        )
        .bind(new_id("tip"))
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(tip)
    }

    pub async fn list(&self, page: Pagination) -> Result<Paginated<Tip>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, category, created_by, created_at, updated_at,
                   COUNT(*) OVER() AS total
            FROM tips
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
            listed.total = count_rows(self.pool, "tips").await?;
        }
        Ok(listed)
    }

    pub async fn get(&self, id: &str) -> Result<Tip, DbError> {
        sqlx::query_as::<_, Tip>(
            r#"
            SELECT id, title, content, category, created_by, created_at, updated_at
            FROM tips
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: &str, input: &TipInput) -> Result<Tip, DbError> {
        sqlx::query_as::<_, Tip>(
            r#"
            UPDATE tips
            SET title = $2, content = $3, category = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, category, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM tips WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Tips whose title or content contains the keyword (case-insensitive)
    pub async fn search(&self, keyword: &str) -> Result<Vec<Tip>, DbError> {
        let tips = sqlx::query_as::<_, Tip>(
            r#"
            SELECT id, title, content, category, created_by, created_at, updated_at
            FROM tips
            WHERE title ILIKE $1 OR content ILIKE $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(like_pattern(keyword))
        .bind(SEARCH_LIMIT)
        .fetch_all(self.pool)
        .await?;

        Ok(tips)
    }
}

fn not_found(id: &str) -> DbError {
    DbError::NotFound {
        resource: "tip",
        id: id.to_owned(),
    }
}
