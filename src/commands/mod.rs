//! CLI command definitions and dispatch.

pub mod account;
pub mod migrate;
pub mod session;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use keyward_auth::SessionManager;
use keyward_core::config::{AppConfig, RepositoryBackend};
use keyward_core::error::AppError;
use keyward_database::{DatabasePool, MemoryUserRepository, PgUserRepository, UserRepository};

use crate::output::OutputFormat;

/// Keyward: credential and refresh session manager
#[derive(Debug, Parser)]
#[command(name = "keyward", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Register a new user
    SignUp(account::SignUpArgs),
    /// Sign in and print a new token pair
    SignIn(account::SignInArgs),
    /// Revoke the session a refresh token belongs to
    SignOut(token::TokenArgs),
    /// Verify an access token, or a refresh token with `--refresh`
    Check(token::CheckArgs),
    /// Issue a new access token from a refresh token
    Refresh(token::TokenArgs),
    /// Exchange a refresh token for a new token pair
    Rotate(token::TokenArgs),
    /// Show the number of open sessions for a user
    Sessions(session::SessionsArgs),
    /// Prune refresh tokens that no longer verify
    Cleanup(session::CleanupArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(&config, self.format).await,
            Commands::SignUp(args) => account::sign_up(args, &config, self.format).await,
            Commands::SignIn(args) => account::sign_in(args, &config, self.format).await,
            Commands::SignOut(args) => token::sign_out(args, &config, self.format).await,
            Commands::Check(args) => token::check(args, &config, self.format).await,
            Commands::Refresh(args) => token::refresh(args, &config, self.format).await,
            Commands::Rotate(args) => token::rotate(args, &config, self.format).await,
            Commands::Sessions(args) => session::sessions(args, &config, self.format).await,
            Commands::Cleanup(args) => session::cleanup(args, &config, self.format).await,
        }
    }
}

/// Helper: create the configured user repository
pub async fn create_repository(config: &AppConfig) -> Result<Arc<dyn UserRepository>, AppError> {
    match config.database.backend {
        RepositoryBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            Ok(Arc::new(PgUserRepository::new(pool.into_pool())))
        }
        RepositoryBackend::Memory => {
            warn!("Using the in-memory repository; nothing outlives this process");
            Ok(Arc::new(MemoryUserRepository::new()))
        }
    }
}

/// Helper: build a session manager over the configured repository
pub async fn create_manager(config: &AppConfig) -> Result<SessionManager, AppError> {
    let repo = create_repository(config).await?;
    SessionManager::from_config(&config.auth, &config.session, repo)
}
