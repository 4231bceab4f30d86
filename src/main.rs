//! Review Web API - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Parse the command line
//! 2. Load configuration from environment variables
//! 3. Create database connection pool
//! 4. Run database migrations
//! 5. Serve HTTP, or run an administration command

use clap::Parser;
use tracing_subscriber::EnvFilter;

use review_web_api::{cli, config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Reads RUST_LOG (defaults to "info"). Logs go to stderr so dumpdata output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    cli::run(cli, pool, config).await
}
