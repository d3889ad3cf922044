//! Market price repository

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use sikuwat_core::drafts::{parse_date, MarketPriceDraft};

use super::{count_rows, counted, new_id, DbError};
use crate::models::{Paginated, Pagination};

/// Commodity price row
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MarketPrice {
    pub id: String,
    pub commodity: String,
    pub price: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated market price fields
#[derive(Debug, Clone, PartialEq)]
pub struct MarketPriceInput {
    pub commodity: String,
    pub price: f64,
    pub unit: String,
    pub date: NaiveDate,
}

impl MarketPriceInput {
    /// Take the fields of a draft that passed validation. A missing date
    /// means `today`.
    pub fn from_draft(draft: &MarketPriceDraft, today: NaiveDate) -> Self {
        Self {
            commodity: draft.commodity.as_deref().unwrap_or_default().trim().to_string(),
            price: draft.price.unwrap_or_default(),
            unit: draft.unit.as_deref().unwrap_or_default().trim().to_string(),
            date: draft
                .date
                .as_deref()
                .and_then(|d| parse_date(d).ok())
                .unwrap_or(today),
        }
    }
}

pub struct MarketPriceRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MarketPriceRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        input: &MarketPriceInput,
        created_by: &str,
    ) -> Result<MarketPrice, DbError> {
        let price = sqlx::query_as::<_, MarketPrice>(
            r#"
            INSERT INTO market_prices (id, commodity, price, unit, date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, commodity, price, unit, date, created_by, created_at, updated_at
            "#,
        )
        .bind(new_id("price"))
        .bind(&input.commodity)
        .bind(input.price)
        .bind(&input.unit)
        .bind(input.date)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(price)
    }

    /// List prices, newest first.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<MarketPrice>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, commodity, price, unit, date, created_by, created_at, updated_at,
                   COUNT(*) OVER() AS total
            FROM market_prices
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
            listed.total = count_rows(self.pool, "market_prices").await?;
        }
        Ok(listed)
    }

    pub async fn get(&self, id: &str) -> Result<MarketPrice, DbError> {
        sqlx::query_as::<_, MarketPrice>(
            r#"
            SELECT id, commodity, price, unit, date, created_by, created_at, updated_at
            FROM market_prices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, id: &str, input: &MarketPriceInput) -> Result<MarketPrice, DbError> {
        sqlx::query_as::<_, MarketPrice>(
            r#"
            UPDATE market_prices
            SET commodity = $2, price = $3, unit = $4, date = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, commodity, price, unit, date, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.commodity)
        .bind(input.price)
        .bind(&input.unit)
        .bind(input.date)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM market_prices WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: &str) -> DbError {
    DbError::NotFound {
        resource: "market price",
        id: id.to_owned(),
    }
}
