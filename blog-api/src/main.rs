use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::Repositories;
use domain::user::RegisterRequest;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[derive(Debug, Parser)]
#[command(name = "blog-api", version, about = "Blog REST API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create a staff + superuser account.
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_access_ttl_seconds,
        settings.jwt_refresh_ttl_seconds,
    ));
    let state = AppState::new(Repositories::postgres(pool), jwt);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run_http(&settings, state).await,
        Command::CreateAdmin {
            username,
            email,
            password,
        } => {
            let admin = state
                .auth_service
                .create_admin(RegisterRequest {
                    username,
                    email,
                    password,
                    avatar: None,
                    bio: None,
                })
                .await
                .map_err(|err| anyhow!("failed to create admin: {err}"))?;
            info!(user_id = admin.id, username = %admin.username, "admin ready");
            Ok(())
        }
    }
}
