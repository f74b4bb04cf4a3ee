//! # Storage and Persistence
//!
//! Database connectivity and the persistence layer for user accounts and
//! refresh tokens.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{run_migrations, validate_migrations};
pub use pool::{create_pool, DbPool};
pub use repositories::{
    NewRefreshToken, RefreshTokenRecord, RefreshTokenRepository, SqlxRefreshTokenRepository,
    SqlxUserRepository, UserRepository,
};

use crate::errors::{GatehouseError, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| GatehouseError::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
