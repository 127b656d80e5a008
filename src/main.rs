//! Keyward CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use commands::Cli;
use keyward_core::config::{AppConfig, LoggingConfig};
use keyward_core::error::AppError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        output::print_error(&e.to_string());
        std::process::exit(exit_code(&e));
    }
}

/// `EX_TEMPFAIL` for failures worth retrying, 1 otherwise.
fn exit_code(err: &AppError) -> i32 {
    if err.is_transient() { 75 } else { 1 }
}

/// Initialize tracing/logging. Logs go to stderr so command output on
/// stdout stays machine-readable.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
