//! Sign-up and sign-in commands.

use clap::Args;

use keyward_core::config::AppConfig;
use keyward_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for `sign-up`
#[derive(Debug, Args)]
pub struct SignUpArgs {
    /// Email address, used as the account key
    #[arg(long)]
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Password
    #[arg(long, env = "KEYWARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for `sign-in`
#[derive(Debug, Args)]
pub struct SignInArgs {
    /// Email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long, env = "KEYWARD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Register a new user.
pub async fn sign_up(
    args: &SignUpArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    manager
        .sign_up(&args.email, &args.name, &args.password)
        .await?;

    output::print_success(&format!("User '{}' registered.", args.email), format);
    Ok(())
}

/// Sign in and print the issued token pair.
pub async fn sign_in(
    args: &SignInArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    let tokens = manager.sign_in(&args.email, &args.password).await?;

    output::print_item(&tokens, format);
    Ok(())
}
