//! Refresh token repository
//!
//! Persists the set of currently-valid refresh tokens, keyed by the literal
//! token string. Deletion is the revocation mechanism: once a row is gone
//! the token never validates again, regardless of its signature.

use crate::domain::UserId;
use crate::errors::{GatehouseError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct RefreshTokenRow {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Stored representation of a refresh token.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// New refresh token payload.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token: String,
    pub user_id: UserId,
}

/// Persistence contract for refresh tokens.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Find a refresh token by its exact token string
    async fn find_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>>;

    /// Insert a newly issued refresh token
    async fn insert_token(&self, token: NewRefreshToken) -> Result<()>;

    /// Delete a refresh token, returning whether a row was actually removed.
    ///
    /// Under concurrent consumption of the same token the row count decides
    /// the winner: exactly one caller observes `true`.
    async fn delete_token(&self, token: &str) -> Result<bool>;
}

#[derive(Debug, Clone)]
pub struct SqlxRefreshTokenRepository {
    pool: DbPool,
}

impl SqlxRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for SqlxRefreshTokenRepository {
    #[instrument(skip(self, token), name = "db_find_refresh_token")]
    async fn find_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT token, user_id, created_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to fetch refresh token".to_string(),
        })?;

        Ok(row.map(|r| RefreshTokenRecord {
            token: r.token,
            user_id: UserId::from_string(r.user_id),
            created_at: r.created_at,
        }))
    }

    #[instrument(skip(self, token), fields(user_id = %token.user_id), name = "db_insert_refresh_token")]
    async fn insert_token(&self, token: NewRefreshToken) -> Result<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(&token.token)
        .bind(token.user_id.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to insert refresh token".to_string(),
        })?;

        Ok(())
    }

    #[instrument(skip(self, token), name = "db_delete_refresh_token")]
    async fn delete_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|err| GatehouseError::Database {
                source: err,
                context: "Failed to delete refresh token".to_string(),
            })?;

        Ok(result.rows_affected() > 0)
    }
}
