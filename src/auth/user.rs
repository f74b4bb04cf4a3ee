//! User domain models and data structures.
//!
//! Defines the core user entity, its verification-status lifecycle, and the
//! payloads used to create and update stored accounts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::UserId;

/// Email verification lifecycle for a user account.
///
/// `Unverified → Verified` happens exactly once, via email-verify-token
/// consumption. `Banned` is an administrative state reachable from anywhere
/// and never left through token flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyStatus {
    Unverified,
    Verified,
    Banned,
}

impl VerifyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyStatus::Unverified => "unverified",
            VerifyStatus::Verified => "verified",
            VerifyStatus::Banned => "banned",
        }
    }
}

impl Display for VerifyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VerifyStatus {
    type Err = VerifyStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(VerifyStatus::Unverified),
            "verified" => Ok(VerifyStatus::Verified),
            "banned" => Ok(VerifyStatus::Banned),
            other => Err(VerifyStatusParseError(other.to_string())),
        }
    }
}

/// Error returned when verify status parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid verify status: {0}")]
pub struct VerifyStatusParseError(pub String);

/// Stored representation of a user account.
///
/// The password hash never leaves the storage layer; repository methods
/// that need it return it alongside the user instead of embedding it here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub verify_status: VerifyStatus,
    pub email_verify_token: Option<String>,
    pub forgot_password_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the account is banned.
    pub fn is_banned(&self) -> bool {
        matches!(self.verify_status, VerifyStatus::Banned)
    }

    /// Check if the account's email has been verified.
    pub fn is_verified(&self) -> bool {
        matches!(self.verify_status, VerifyStatus::Verified)
    }

    /// Normalize email to lowercase for consistent storage and comparison.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

/// New user creation payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: NaiveDate,
    pub verify_status: VerifyStatus,
    pub email_verify_token: Option<String>,
}

/// Update payload for an existing user.
///
/// The token columns use a double Option: the outer layer means "change
/// this column", the inner layer is the new value (None clears it).
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub verify_status: Option<VerifyStatus>,
    pub email_verify_token: Option<Option<String>>,
    pub forgot_password_token: Option<Option<String>>,
}

/// Response shape for a user record (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub verify_status: VerifyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            date_of_birth: user.date_of_birth,
            verify_status: user.verify_status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(status: VerifyStatus) -> User {
        User {
            id: UserId::new(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            verify_status: status,
            email_verify_token: None,
            forgot_password_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn verify_status_round_trip() {
        for (input, expected) in [
            ("unverified", VerifyStatus::Unverified),
            ("verified", VerifyStatus::Verified),
            ("banned", VerifyStatus::Banned),
        ] {
            let parsed = input.parse::<VerifyStatus>().unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), input);
        }

        let err = "invalid".parse::<VerifyStatus>().unwrap_err();
        assert_eq!(err.0, "invalid");
    }

    #[test]
    fn user_status_predicates() {
        assert!(sample_user(VerifyStatus::Banned).is_banned());
        assert!(!sample_user(VerifyStatus::Unverified).is_banned());
        assert!(sample_user(VerifyStatus::Verified).is_verified());
        assert!(!sample_user(VerifyStatus::Unverified).is_verified());
    }

    #[test]
    fn email_normalization() {
        assert_eq!(User::normalize_email("Test@Example.COM"), "test@example.com");
        assert_eq!(User::normalize_email("  user@HOST.com  "), "user@host.com");
    }

    #[test]
    fn user_response_drops_token_fields() {
        let mut user = sample_user(VerifyStatus::Unverified);
        user.email_verify_token = Some("tok".to_string());

        let response: UserResponse = user.clone().into();
        assert_eq!(response.id, user.id);
        assert_eq!(response.email, user.email);

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("tok"));
        assert!(!json.contains("passwordHash"));
    }
}
