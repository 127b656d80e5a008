//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate, with `KEYWARD__`-prefixed environment variables layered
//! on top (`KEYWARD__AUTH__ACCESS_SECRET`, `KEYWARD__DATABASE__URL`, ...).

pub mod auth;
pub mod database;
pub mod logging;
pub mod session;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, RepositoryBackend};
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Token signing and password hashing settings.
    pub auth: AuthConfig,
    /// Session store settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// User repository settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional; environment variables prefixed with
    /// `KEYWARD` (using `__` as the nesting separator) override it. The
    /// result is validated before it is returned.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("KEYWARD")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let app: Self = builder.build()?.try_deserialize()?;

        app.auth.validate()?;
        app.session.validate()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<AppConfig, AppError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));
        AppConfig::from_builder(builder)
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = parse(
            r#"
            [auth]
            access_secret = "a-secret"
            refresh_secret = "r-secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.access_ttl_seconds, 900);
        assert_eq!(config.auth.password_min_length, 8);
        assert_eq!(config.session.store_timeout_ms, 5_000);
        assert_eq!(config.database.backend, RepositoryBackend::Postgres);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_memory_backend_parsed() {
        let config = parse(
            r#"
            [auth]
            access_secret = "a-secret"
            refresh_secret = "r-secret"

            [database]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, RepositoryBackend::Memory);
    }

    #[test]
    fn test_identical_secrets_fail_load() {
        let err = parse(
            r#"
            [auth]
            access_secret = "shared"
            refresh_secret = "shared"
            "#,
        )
        .unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_cleanup_interval_fails_load() {
        let err = parse(
            r#"
            [auth]
            access_secret = "a-secret"
            refresh_secret = "r-secret"

            [session]
            cleanup_interval_minutes = 0
            "#,
        )
        .unwrap_err();

        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_secrets_fail_load() {
        assert!(parse("[logging]\nlevel = \"debug\"\n").is_err());
    }
}
