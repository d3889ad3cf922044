//! Schema migrations
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so `run` is safe on each
//! start-up.

use sqlx::PgPool;

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    // Account profiles (approval state for farmers)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email TEXT,
            name TEXT,
            role TEXT NOT NULL DEFAULT 'user',
            is_approved BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_prices (
            id TEXT PRIMARY KEY,
            commodity TEXT NOT NULL,
            price DOUBLE PRECISION NOT NULL,
            unit TEXT NOT NULL,
            date DATE NOT NULL DEFAULT CURRENT_DATE,
            created_by TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            source TEXT,
            url TEXT,
            image_url TEXT,
            created_by TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tips (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'general',
            created_by TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plantings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            user_name TEXT,
            seed_type TEXT NOT NULL,
            seed_count BIGINT NOT NULL CHECK (seed_count > 0),
            planting_date DATE NOT NULL,
            harvest_date DATE,
            harvest_yield DOUBLE PRECISION CHECK (harvest_yield >= 0),
            sales_amount DOUBLE PRECISION CHECK (sales_amount >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the newest-first listings and owner lookups
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_market_prices_created ON market_prices(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_articles_created ON articles(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_tips_created ON tips(created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_plantings_user ON plantings(user_id, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_profiles_pending ON profiles(created_at) WHERE NOT is_approved",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database migrations complete");
    Ok(())
}
