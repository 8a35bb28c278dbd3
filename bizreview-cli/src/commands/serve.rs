//! HTTP server command for the bizreview API

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use bizreview_server::db::migrations;
use bizreview_server::http::{run_server, AppState, ServerConfig};
use clap::Parser;

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "BIZREVIEW_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,

    /// Public base URL used in self/next/business links (default: from request Host)
    #[arg(long, env = "BIZREVIEW_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", env = "BIZREVIEW_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Keep data in process memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    pub in_memory: bool,

    /// Do not create tables on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            public_url: self.public_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.server_config();

    let state = if args.in_memory {
        if args.db.database_url.is_some() {
            tracing::warn!("--in-memory set, ignoring DATABASE_URL");
        }
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        AppState::in_memory()
    } else {
        let pool = args.db.connect().await?;
        if args.skip_migrations {
            tracing::info!("Skipping migrations");
        } else {
            migrations::run(&pool)
                .await
                .context("Failed to run migrations")?;
        }
        AppState::postgres(pool)
    };

    tracing::info!("Starting bizreview server on {}", config.bind_addr);

    // Run server (blocks until shutdown)
    run_server(state, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_args() {
        let args = ServeArgs::try_parse_from([
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--public-url",
            "https://reviews.example",
            "--timeout",
            "5",
            "--in-memory",
        ])
        .unwrap();

        let config = args.server_config();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.public_url.as_deref(), Some("https://reviews.example"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(args.in_memory);
    }

    #[test]
    fn rejects_bad_bind() {
        assert!(ServeArgs::try_parse_from(["serve", "--bind", "not-an-addr"]).is_err());
    }
}
