//! Planting record repository
//!
//! Farmers only ever see and change their own rows: every read or write on
//! behalf of a farmer carries `user_id = $n`, and a statement matching zero
//! rows is reported as [`DbError::NotOwned`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use sikuwat_core::drafts::{parse_date, HarvestDraft, PlantingDraft};
use sikuwat_core::stats::HarvestFigures;

use super::{count_rows, counted, new_id, DbError};
use crate::models::{Paginated, Pagination};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Planting {
    pub id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub seed_type: String,
    pub seed_count: i64,
    pub planting_date: NaiveDate,
    pub harvest_date: Option<NaiveDate>,
    pub harvest_yield: Option<f64>,
    pub sales_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Planting {
    /// Stored fields in request form, the base for partial updates
    pub fn to_draft(&self) -> PlantingDraft {
        PlantingDraft {
            seed_type: Some(self.seed_type.clone()),
            seed_count: Some(self.seed_count),
            planting_date: Some(self.planting_date.to_string()),
            harvest_date: self.harvest_date.map(|d| d.to_string()),
            harvest_yield: self.harvest_yield,
            sales_amount: self.sales_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlantingInput {
    pub seed_type: String,
    pub seed_count: i64,
    pub planting_date: NaiveDate,
    pub harvest_date: Option<NaiveDate>,
    pub harvest_yield: Option<f64>,
    pub sales_amount: Option<f64>,
}

impl PlantingInput {
    /// Take the fields of a draft that passed validation
    pub fn from_draft(draft: &PlantingDraft) -> Self {
        let date = |v: &Option<String>| v.as_deref().and_then(|d| parse_date(d).ok());
        Self {
            seed_type: draft.seed_type.as_deref().unwrap_or_default().trim().to_string(),
            seed_count: draft.seed_count.unwrap_or_default(),
            planting_date: date(&draft.planting_date).unwrap_or_default(),
            harvest_date: date(&draft.harvest_date),
            harvest_yield: draft.harvest_yield,
            sales_amount: draft.sales_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarvestInput {
    pub harvest_date: NaiveDate,
    pub harvest_yield: f64,
    pub sales_amount: Option<f64>,
}

impl HarvestInput {
    pub fn from_draft(draft: &HarvestDraft) -> Self {
        Self {
            harvest_date: draft
                .harvest_date
                .as_deref()
                .and_then(|d| parse_date(d).ok())
                .unwrap_or_default(),
            harvest_yield: draft.harvest_yield.unwrap_or_default(),
            sales_amount: draft.sales_amount(),
        }
    }
}

const COLUMNS: &str = "id, user_id, user_name, seed_type, seed_count, planting_date, \
     harvest_date, harvest_yield, sales_amount, created_at, updated_at";

pub struct PlantingRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PlantingRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        user_name: Option<&str>,
        input: &PlantingInput,
    ) -> Result<Planting, DbError> {
        let sql = format!(
            r#"
            INSERT INTO plantings (id, user_id, user_name, seed_type, seed_count, planting_date,
                                   harvest_date, harvest_yield, sales_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        );
        let planting = sqlx::query_as::<_, Planting>(&sql)
            .bind(new_id("planting"))
            .bind(user_id)
            .bind(user_name)
            .bind(&input.seed_type)
            .bind(input.seed_count)
            .bind(input.planting_date)
            .bind(input.harvest_date)
            .bind(input.harvest_yield)
            .bind(input.sales_amount)
            .fetch_one(self.pool)
            .await?;

        Ok(planting)
    }

    /// A farmer's plantings, newest first. `pending_only` keeps the ones
    /// without a harvest date.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        pending_only: bool,
        page: Pagination,
    ) -> Result<Paginated<Planting>, DbError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}, COUNT(*) OVER() AS total
            FROM plantings
            WHERE user_id = $1 AND (NOT $2 OR harvest_date IS NULL)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(pending_only)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(self.pool)
            .await?;

        let mut listed = Paginated::from_rows(counted(rows)?, page);
        if listed.past_end() {
            let (total,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM plantings WHERE user_id = $1 AND (NOT $2 OR harvest_date IS NULL)",
            )
            .bind(user_id)
            .bind(pending_only)
            .fetch_one(self.pool)
            .await?;
            listed.total = total;
        }
        Ok(listed)
    }

    /// Every farmer's plantings (admin view)
    pub async fn list_all(&self, page: Pagination) -> Result<Paginated<Planting>, DbError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}, COUNT(*) OVER() AS total
            FROM plantings
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(self.pool)
            .await?;

        let mut listed = Paginated::from_rows(counted(rows)?, page);
        if listed.past_end() {
            listed.total = count_rows(self.pool, "plantings").await?;
        }
        Ok(listed)
    }

    pub async fn get_owned(&self, id: &str, user_id: &str) -> Result<Planting, DbError> {
        let sql = format!("SELECT {COLUMNS} FROM plantings WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Planting>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| not_owned(id))
    }

    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        input: &PlantingInput,
    ) -> Result<Planting, DbError> {
        let sql = format!(
            r#"
            UPDATE plantings
            SET seed_type = $3, seed_count = $4, planting_date = $5, harvest_date = $6,
                harvest_yield = $7, sales_amount = $8, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Planting>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&input.seed_type)
            .bind(input.seed_count)
            .bind(input.planting_date)
            .bind(input.harvest_date)
            .bind(input.harvest_yield)
            .bind(input.sales_amount)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| not_owned(id))
    }

    pub async fn record_harvest(
        &self,
        id: &str,
        user_id: &str,
        harvest: &HarvestInput,
    ) -> Result<Planting, DbError> {
        let sql = format!(
            r#"
            UPDATE plantings
            SET harvest_date = $3, harvest_yield = $4,
                sales_amount = COALESCE($5, sales_amount), updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Planting>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(harvest.harvest_date)
            .bind(harvest.harvest_yield)
            .bind(harvest.sales_amount)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| not_owned(id))
    }

    pub async fn delete(&self, id: &str, user_id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM plantings WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_owned(id));
        }
        Ok(())
    }

    /// Yield and sales of one farmer's plantings, or of everyone's when
    /// `user_id` is None
    pub async fn figures(&self, user_id: Option<&str>) -> Result<Vec<HarvestFigures>, DbError> {
        let rows: Vec<(Option<f64>, Option<f64>)> = sqlx::query_as(
            r#"
            SELECT harvest_yield, sales_amount
            FROM plantings
            WHERE $1::TEXT IS NULL OR user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(harvest_yield, sales_amount)| HarvestFigures {
                harvest_yield,
                sales_amount,
            })
            .collect())
    }
}

fn not_owned(id: &str) -> DbError {
    DbError::NotOwned {
        resource: "planting data",
        id: id.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvest_input_derives_sales() {
        let draft = HarvestDraft {
            harvest_date: Some("2024-09-01".into()),
            harvest_yield: Some(800.0),
            price_per_kg: Some(6_000.0),
        };
        let input = HarvestInput::from_draft(&draft);
        assert_eq!(input.harvest_date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
        assert_eq!(input.sales_amount, Some(4_800_000.0));
    }

    #[test]
    fn planting_input_from_draft() {
        let draft = PlantingDraft {
            seed_type: Some(" Padi IR64 ".into()),
            seed_count: Some(30),
            planting_date: Some("2024-06-01".into()),
            harvest_date: Some("".into()),
            ..Default::default()
        };
        let input = PlantingInput::from_draft(&draft);
        assert_eq!(input.seed_type, "Padi IR64");
        assert_eq!(input.harvest_date, None);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn other_users_cannot_touch_a_planting() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");
        let repo = PlantingRepo::new(&pool);

        let input = PlantingInput {
            seed_type: "Jagung Manis".into(),
            seed_count: 200,
            planting_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            harvest_date: None,
            harvest_yield: None,
            sales_amount: None,
        };
        let planting = repo.create("farmer-a", Some("Ani"), &input).await.expect("create");

        assert!(matches!(
            repo.get_owned(&planting.id, "farmer-b").await,
            Err(DbError::NotOwned { .. })
        ));
        assert!(matches!(
            repo.delete(&planting.id, "farmer-b").await,
            Err(DbError::NotOwned { .. })
        ));

        let pending = repo
            .list_for_user("farmer-a", true, Pagination::default())
            .await
            .expect("pending");
        assert!(pending.items.iter().any(|p| p.id == planting.id));

        let harvest = HarvestInput {
            harvest_date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            harvest_yield: 500.0,
            sales_amount: Some(2_000_000.0),
        };
        let harvested = repo
            .record_harvest(&planting.id, "farmer-a", &harvest)
            .await
            .expect("harvest");
        assert_eq!(harvested.harvest_yield, Some(500.0));

        let pending = repo
            .list_for_user("farmer-a", true, Pagination::default())
            .await
            .expect("pending");
        assert!(!pending.items.iter().any(|p| p.id == planting.id));

        repo.delete(&planting.id, "farmer-a").await.expect("delete");
    }
}
