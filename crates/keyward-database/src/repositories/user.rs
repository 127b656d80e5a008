//! PostgreSQL user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use keyward_core::error::{AppError, ErrorKind};
use keyward_core::result::AppResult;
use keyward_entity::user::{CreateUser, User};

use super::UserRepository;

const USER_COLUMNS: &str = "email, name, password_hash, refresh_tokens, created_at";

/// User repository backed by the `users` table.
///
/// The refresh set is a `TEXT[]` column; each mutation is a single
/// `UPDATE` so Postgres row locking serializes concurrent writers.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict(format!("Email '{}' is already registered", data.email))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(total as u64)
    }

    async fn list_emails(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar("SELECT email FROM users ORDER BY email")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    async fn add_refresh_token(&self, email: &str, token: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_tokens = CASE \
                WHEN $2 = ANY(refresh_tokens) THEN refresh_tokens \
                ELSE array_append(refresh_tokens, $2) END \
             WHERE email = $1",
        )
        .bind(email)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to add refresh token", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_refresh_token(&self, email: &str, token: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_tokens = array_remove(refresh_tokens, $2) WHERE email = $1",
        )
        .bind(email)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to remove refresh token", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_refresh_token(&self, email: &str, old: &str, new: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_tokens = array_append(array_remove(refresh_tokens, $2), $3) \
             WHERE email = $1 AND $2 = ANY(refresh_tokens)",
        )
        .bind(email)
        .bind(old)
        .bind(new)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rotate refresh token", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_refresh_tokens(&self, email: &str, tokens: &[String]) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET refresh_tokens = ARRAY( \
                SELECT t FROM unnest(refresh_tokens) AS t WHERE NOT (t = ANY($2))) \
             WHERE email = $1",
        )
        .bind(email)
        .bind(tokens)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to prune refresh tokens", e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
