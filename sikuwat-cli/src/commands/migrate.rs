//! Apply database migrations without starting the server

use anyhow::{Context, Result};
use clap::Parser;

use sikuwat_core::SikuwatConfig;
use sikuwat_server::db::{create_pool_with_options, migrations};

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs, config: &SikuwatConfig) -> Result<()> {
    let database_url = args
        .database_url
        .or(config.database.url.clone())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.sikuwat/.env")?;

    let pool = create_pool_with_options(&database_url, 1)
        .await
        .context("Failed to connect to database")?;

    migrations::run(&pool)
        .await
        .context("Failed to run database migrations")?;

    println!("✓ Database schema is up to date");
    Ok(())
}
