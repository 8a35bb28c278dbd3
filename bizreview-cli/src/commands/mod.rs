//! Command implementations for the bizreview CLI

pub mod migrate;
pub mod serve;

use anyhow::{Context, Result};
use bizreview_server::db::{create_pool_with_options, pool::DEFAULT_MAX_CONNECTIONS};
use clap::Args;
use sqlx::PgPool;

pub use migrate::run_migrate;
pub use serve::run_serve;

/// Database connection arguments shared by commands
#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Database URL (overrides environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "BIZREVIEW_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl DatabaseArgs {
    /// Connect a pool, failing early with a hint when no URL is configured.
    pub async fn connect(&self) -> Result<PgPool> {
        let database_url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

        create_pool_with_options(database_url, self.max_connections)
            .await
            .context("Failed to create database pool")
    }
}
