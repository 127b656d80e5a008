//! Commands that take a token: check, refresh, rotate, sign-out.

use chrono::{DateTime, Utc};
use clap::Args;
use clap::builder::NonEmptyStringValueParser;
use serde::Serialize;

use keyward_auth::jwt::TokenClaims;
use keyward_auth::{AuthError, TokenError};
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;

use crate::output::{self, OutputFormat};

/// A single token argument
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Refresh token
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub token: String,
}

/// Arguments for `check`
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Token to verify
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    pub token: String,

    /// Treat the token as a refresh token and check it is still active
    #[arg(long)]
    pub refresh: bool,
}

/// Claims of a verified token with a readable expiry.
#[derive(Debug, Serialize)]
struct VerifiedToken<'a, C> {
    #[serde(flatten)]
    claims: &'a C,
    expires_at: DateTime<Utc>,
}

impl<'a, C: TokenClaims> VerifiedToken<'a, C> {
    fn new(claims: &'a C) -> Self {
        Self {
            claims,
            expires_at: claims.expires_at(),
        }
    }
}

/// Verify a token and print its claims.
pub async fn check(
    args: &CheckArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;

    if args.refresh {
        let claims = manager
            .refresh_session(&args.token)
            .await
            .ok_or(AuthError::InvalidToken(TokenError::Revoked))?;
        output::print_item(&VerifiedToken::new(&claims), format);
    } else {
        let claims = manager.check_access(&args.token)?;
        output::print_item(&VerifiedToken::new(&claims), format);
    }

    Ok(())
}

/// Issue a new access token.
pub async fn refresh(
    args: &TokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    let access = manager.refresh_access(&args.token).await?;

    output::print_item(&access, format);
    Ok(())
}

/// Exchange a refresh token for a new pair.
pub async fn rotate(
    args: &TokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    let tokens = manager.rotate(&args.token).await?;

    output::print_item(&tokens, format);
    Ok(())
}

/// Revoke the session behind a refresh token.
pub async fn sign_out(
    args: &TokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    manager.sign_out(&args.token).await?;

    output::print_success("Signed out.", format);
    Ok(())
}
