//! Request and response payloads for the authentication flows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::UserId;

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// ISO-8601 date string, e.g. `2000-01-01`
    pub date_of_birth: String,
}

/// User authentication credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request carrying a refresh token (logout and refresh).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request carrying an email verification token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub email_verify_token: String,
}

/// Request to start the password reset flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request to check a forgot-password token before showing the reset form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyForgotPasswordRequest {
    pub forgot_password_token: String,
}

/// Request to set a new password using a forgot-password token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub forgot_password_token: String,
    pub password: String,
    pub confirm_password: String,
}

/// A freshly minted access + refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user_id: UserId,
    pub tokens: TokenPair,
}

/// Outcome of consuming an email-verify token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailVerification {
    /// The account transitioned Unverified → Verified.
    Verified,
    /// The account was already verified; the call is a reported no-op.
    AlreadyVerified,
}
