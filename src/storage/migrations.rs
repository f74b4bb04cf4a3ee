//! # Database Migration Management
//!
//! Handles database schema evolution using SQL migrations embedded in the
//! binary and executed automatically on application startup when
//! auto_migrate is enabled.

use crate::errors::{GatehouseError, Result};
use crate::storage::DbPool;
use sqlx::Row;
use tracing::{error, info, warn};

/// Migration files, ordered by version prefix. Embedded so the binary and
/// the test suite never depend on the process working directory.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250301000001_create_users",
        include_str!("../../migrations/20250301000001_create_users.sql"),
    ),
    (
        "20250301000002_create_refresh_tokens",
        include_str!("../../migrations/20250301000002_create_refresh_tokens.sql"),
    ),
];

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Starting database migration process");

    create_migration_table(pool).await?;

    let applied = get_applied_migration_versions(pool).await?;

    let mut migrations_run = 0;
    for (filename, sql) in MIGRATIONS {
        let version = extract_version_from_filename(filename)?;

        if applied.contains(&version) {
            continue;
        }

        info!(version = version, "Running migration: {}", filename);
        let start_time = std::time::Instant::now();

        let mut tx = pool.begin().await.map_err(|e| GatehouseError::Database {
            source: e,
            context: "Failed to start migration transaction".to_string(),
        })?;

        // raw_sql supports multi-statement migration files
        sqlx::raw_sql(sql).execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, migration = filename, "Migration failed");
            GatehouseError::Database {
                source: e,
                context: format!("Migration failed: {}", filename),
            }
        })?;

        let execution_time = start_time.elapsed().as_millis() as i64;
        let checksum = calculate_checksum(sql);

        sqlx::query(
            "INSERT INTO _gatehouse_migrations (version, description, checksum, execution_time, installed_on) VALUES ($1, $2, $3, $4, $5)"
        )
        .bind(version)
        .bind(filename)
        .bind(&checksum)
        .bind(execution_time)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, migration = filename, "Failed to record migration");
            GatehouseError::Database {
                source: e,
                context: format!("Failed to record migration: {}", filename),
            }
        })?;

        tx.commit().await.map_err(|e| GatehouseError::Database {
            source: e,
            context: "Failed to commit migration transaction".to_string(),
        })?;

        migrations_run += 1;
        info!(
            version = version,
            execution_time_ms = execution_time,
            "Migration completed: {}",
            filename
        );
    }

    if migrations_run > 0 {
        info!(count = migrations_run, "Database migrations completed");
    } else {
        info!("No pending migrations");
    }

    Ok(())
}

/// Validate that all embedded migrations have been applied
pub async fn validate_migrations(pool: &DbPool) -> Result<bool> {
    let applied_versions = get_applied_migration_versions(pool).await?;

    for (filename, _) in MIGRATIONS {
        let expected = extract_version_from_filename(filename)?;
        if !applied_versions.contains(&expected) {
            warn!(version = expected, "Missing migration");
            return Ok(false);
        }
    }

    Ok(true)
}

/// Create the migration tracking table
async fn create_migration_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _gatehouse_migrations (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            checksum BLOB NOT NULL,
            execution_time BIGINT NOT NULL,
            installed_on DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    )
    .execute(pool)
    .await
    .map_err(|e| GatehouseError::Database {
        source: e,
        context: "Failed to create migration tracking table".to_string(),
    })?;

    Ok(())
}

/// Get list of applied migration versions
async fn get_applied_migration_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _gatehouse_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| GatehouseError::Database {
            source: e,
            context: "Failed to get applied migrations".to_string(),
        })?;

    Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect())
}

/// Extract version number from migration filename
fn extract_version_from_filename(filename: &str) -> Result<i64> {
    let version_str = filename.split('_').next().ok_or_else(|| {
        GatehouseError::validation(format!("Invalid migration filename: {}", filename))
    })?;

    version_str.parse::<i64>().map_err(|_| {
        GatehouseError::validation(format!("Invalid version in filename: {}", filename))
    })
}

/// Calculate checksum for migration content
fn calculate_checksum(content: &str) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish().to_le_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> DbPool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite")
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(
            extract_version_from_filename("20250301000001_create_users").unwrap(),
            20250301000001
        );
        assert!(extract_version_from_filename("not-a-version_foo").is_err());
    }

    #[tokio::test]
    async fn test_run_migrations_is_idempotent() {
        let pool = memory_pool().await;

        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert!(validate_migrations(&pool).await.unwrap());
    }

    #[tokio::test]
    async fn test_migrations_create_expected_tables() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        for table in ["users", "refresh_tokens"] {
            let row = sqlx::query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = $1",
            )
            .bind(table)
            .fetch_optional(&pool)
            .await
            .unwrap();
            assert!(row.is_some(), "missing table {}", table);
        }
    }
}
