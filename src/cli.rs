//! Command-line interface: the server plus a few administration commands.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::{
    AppState,
    config::Config,
    create_router,
    db::DbPool,
    models::user::NewUser,
    services::{fixture_service, session_service, user_service},
};

#[derive(Parser)]
#[command(name = "review_web_api")]
#[command(about = "Review site JSON web API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Register a user account
    #[command(name = "createuser")]
    CreateUser {
        /// Login name
        username: String,

        /// Initial password
        #[arg(long, env = "CREATEUSER_PASSWORD")]
        password: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,

        /// Grant staff status
        #[arg(long)]
        staff: bool,
    },

    /// Load one or more JSON fixture files
    #[command(name = "loaddata")]
    LoadData {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Write all users as a JSON fixture
    #[command(name = "dumpdata")]
    DumpData {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete expired sessions
    #[command(name = "clearsessions")]
    ClearSessions,
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli, pool: DbPool, config: Config) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(pool, config).await,
        Commands::CreateUser {
            username,
            password,
            email,
            first_name,
            last_name,
            staff,
        } => {
            let user = user_service::create_user(
                &pool,
                NewUser {
                    username,
                    password,
                    first_name,
                    last_name,
                    email,
                    is_staff: staff,
                },
            )
            .await?;
            println!("Created user {} (id {})", user.username, user.id);
            Ok(())
        }
        Commands::LoadData { files } => {
            for file in files {
                let summary = fixture_service::load_file(&pool, &file).await?;
                println!(
                    "Installed {} object(s) from {} ({} skipped)",
                    summary.loaded,
                    file.display(),
                    summary.skipped
                );
            }
            Ok(())
        }
        Commands::DumpData { output } => {
            let entries = fixture_service::dump(&pool).await?;
            let json = serde_json::to_string_pretty(&entries)?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::ClearSessions => {
            let removed = session_service::purge_expired(&pool).await?;
            println!("Removed {} expired session(s)", removed);
            Ok(())
        }
    }
}

async fn serve(pool: DbPool, config: Config) -> anyhow::Result<()> {
    tokio::spawn(session_service::run_purge_loop(
        pool.clone(),
        config.session_purge_interval_secs,
    ));

    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = create_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
