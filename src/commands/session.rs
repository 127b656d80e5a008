//! Session inspection and cleanup commands.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tracing::info;

use keyward_auth::SessionCleanup;
use keyward_core::config::AppConfig;
use keyward_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for `sessions`
#[derive(Debug, Args)]
pub struct SessionsArgs {
    /// Email address
    #[arg(long)]
    pub email: String,
}

/// Arguments for `cleanup`
#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Keep running, sweeping every `session.cleanup_interval_minutes`
    #[arg(long)]
    pub watch: bool,
}

#[derive(Debug, Serialize)]
struct SessionSummary<'a> {
    email: &'a str,
    active_sessions: usize,
}

#[derive(Debug, Serialize)]
struct CleanupSummary {
    removed: u32,
}

/// Print the number of open sessions for a user.
pub async fn sessions(
    args: &SessionsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    let active_sessions = manager.active_session_count(&args.email).await?;

    output::print_item(
        &SessionSummary {
            email: &args.email,
            active_sessions,
        },
        format,
    );
    Ok(())
}

/// Run one cleanup cycle, or keep sweeping until interrupted.
pub async fn cleanup(
    args: &CleanupArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = super::create_manager(config).await?;
    let cleanup = Arc::new(SessionCleanup::new(
        manager.session_store(),
        manager.jwt_decoder(),
    ));

    if !args.watch {
        let removed = cleanup.run_cleanup().await?;
        output::print_item(&CleanupSummary { removed }, format);
        return Ok(());
    }

    let interval = config.session.cleanup_interval();
    info!(interval_secs = interval.as_secs(), "Starting periodic session cleanup");
    let handle = cleanup.spawn_periodic(interval);

    tokio::signal::ctrl_c().await?;
    handle.abort();

    output::print_success("Session cleanup stopped.", format);
    Ok(())
}
