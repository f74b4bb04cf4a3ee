//! User repository for account persistence
//!
//! CRUD operations for user accounts, including the authentication lookup
//! that returns the stored password hash.

use crate::auth::user::{NewUser, UpdateUser, User, VerifyStatus};
use crate::domain::UserId;
use crate::errors::{GatehouseError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: NaiveDate,
    pub verify_status: String,
    pub email_verify_token: Option<String>,
    pub forgot_password_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, date_of_birth, verify_status, email_verify_token, forgot_password_token, created_at, updated_at";

/// Persistence contract for user accounts. Lookups are exact-match only.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. The UNIQUE constraint on email is the
    /// authoritative duplicate guard; violations surface as database errors
    /// that the API layer maps to a conflict.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by (normalized) email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user with their password hash for authentication
    async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>>;

    /// Update a user's details
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<User>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<User> {
        let verify_status = VerifyStatus::from_str(&row.verify_status).map_err(|_| {
            GatehouseError::validation(format!("Unknown verify status '{}'", row.verify_status))
        })?;

        Ok(User {
            id: UserId::from_string(row.id),
            name: row.name,
            email: row.email,
            date_of_birth: row.date_of_birth,
            verify_status,
            email_verify_token: row.email_verify_token,
            forgot_password_token: row.forgot_password_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_email = %user.email, user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let status = user.verify_status.to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, date_of_birth, verify_status, email_verify_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.date_of_birth)
        .bind(&status)
        .bind(&user.email_verify_token)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to create user".to_string(),
        })?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| GatehouseError::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user")]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_by_email")]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to fetch user by email".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_with_password")]
    async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to fetch user with password".to_string(),
        })?;

        if let Some(row) = row {
            let password_hash = row.password_hash.clone();
            let user = self.row_to_user(row)?;
            Ok(Some((user, password_hash)))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, update), fields(user_id = %id), name = "db_update_user")]
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<User> {
        let current = self
            .get_user(id)
            .await?
            .ok_or_else(|| GatehouseError::not_found("User", id.to_string()))?;

        let name = update.name.unwrap_or(current.name);
        let password_hash = update.password_hash;
        let verify_status = update.verify_status.unwrap_or(current.verify_status).to_string();
        let email_verify_token =
            update.email_verify_token.unwrap_or(current.email_verify_token);
        let forgot_password_token =
            update.forgot_password_token.unwrap_or(current.forgot_password_token);

        sqlx::query(
            r#"
            UPDATE users
            SET name = $1,
                password_hash = COALESCE($2, password_hash),
                verify_status = $3,
                email_verify_token = $4,
                forgot_password_token = $5,
                updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&name)
        .bind(&password_hash)
        .bind(&verify_status)
        .bind(&email_verify_token)
        .bind(&forgot_password_token)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| GatehouseError::Database {
            source: err,
            context: "Failed to update user".to_string(),
        })?;

        self.get_user(id)
            .await?
            .ok_or_else(|| GatehouseError::internal("User not found after update"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_repo() -> SqlxUserRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        crate::storage::run_migrations(&pool).await.expect("migrations");
        SqlxUserRepository::new(pool)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: UserId::new(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            verify_status: VerifyStatus::Unverified,
            email_verify_token: Some("verify-token".to_string()),
        }
    }

    #[tokio::test]
    async fn create_and_fetch_user() {
        let repo = setup_repo().await;
        let created = repo.create_user(new_user("a@example.com")).await.unwrap();

        assert_eq!(created.email, "a@example.com");
        assert_eq!(created.verify_status, VerifyStatus::Unverified);
        assert_eq!(created.email_verify_token.as_deref(), Some("verify-token"));

        let by_id = repo.get_user(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.id, created.id);

        let by_email = repo.get_user_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.get_user_by_email("missing@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_violates_unique_constraint() {
        let repo = setup_repo().await;
        repo.create_user(new_user("dup@example.com")).await.unwrap();

        let err = repo.create_user(new_user("dup@example.com")).await.unwrap_err();
        match err {
            GatehouseError::Database { source, .. } => {
                let db_err = source.as_database_error().expect("database error");
                assert!(db_err.is_unique_violation());
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_user_with_password() {
        let repo = setup_repo().await;
        repo.create_user(new_user("p@example.com")).await.unwrap();

        let (user, hash) =
            repo.get_user_with_password("p@example.com").await.unwrap().unwrap();
        assert_eq!(user.email, "p@example.com");
        assert_eq!(hash, "$argon2id$stub");
    }

    #[tokio::test]
    async fn update_user_transitions_and_clears_token() {
        let repo = setup_repo().await;
        let created = repo.create_user(new_user("v@example.com")).await.unwrap();

        let updated = repo
            .update_user(
                &created.id,
                UpdateUser {
                    verify_status: Some(VerifyStatus::Verified),
                    email_verify_token: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.verify_status, VerifyStatus::Verified);
        assert!(updated.email_verify_token.is_none());
        // Untouched columns keep their values
        assert_eq!(updated.name, created.name);
    }

    #[tokio::test]
    async fn update_user_overwrites_forgot_password_token() {
        let repo = setup_repo().await;
        let created = repo.create_user(new_user("f@example.com")).await.unwrap();

        let first = repo
            .update_user(
                &created.id,
                UpdateUser {
                    forgot_password_token: Some(Some("first".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(first.forgot_password_token.as_deref(), Some("first"));

        let second = repo
            .update_user(
                &created.id,
                UpdateUser {
                    forgot_password_token: Some(Some("second".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.forgot_password_token.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let repo = setup_repo().await;
        let err = repo.update_user(&UserId::new(), UpdateUser::default()).await.unwrap_err();
        assert!(matches!(err, GatehouseError::NotFound { .. }));
    }
}
