//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - ids are text, prefixed by record kind
//! - lists are newest-first and paginated in a single query
//! - owner-scoped statements that touch zero rows report not-found

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

pub mod articles;
pub mod market_prices;
pub mod plantings;
pub mod profiles;
pub mod tips;

pub use articles::{Article, ArticleInput, ArticleRepo};
pub use market_prices::{MarketPrice, MarketPriceInput, MarketPriceRepo};
pub use plantings::{HarvestInput, Planting, PlantingInput, PlantingRepo};
pub use profiles::{Profile, ProfileRepo};
pub use tips::{Tip, TipInput, TipRepo};

/// Number of rows returned by keyword searches
pub const SEARCH_LIMIT: i64 = 3;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Owner-scoped statement matched nothing: the record is missing or
    /// belongs to someone else. The two cases are not distinguished.
    #[error("{resource} '{id}' not found or unauthorized")]
    NotOwned { resource: &'static str, id: String },
}

/// New record id: kind prefix plus a v4 UUID
pub(crate) fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}

/// Split rows selected with `COUNT(*) OVER() AS total` into records and total
pub(crate) fn counted<T>(rows: Vec<PgRow>) -> Result<Vec<(T, i64)>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    rows.iter()
        .map(|row| -> Result<(T, i64), sqlx::Error> {
            Ok((T::from_row(row)?, row.try_get::<i64, _>("total")?))
        })
        .collect()
}

/// Row count of a whole table, for pages past the end where the window
/// count has no row to ride on
pub(crate) async fn count_rows(pool: &PgPool, table: &'static str) -> Result<i64, sqlx::Error> {
    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// `%keyword%` pattern for ILIKE with the wildcard characters escaped
pub(crate) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
