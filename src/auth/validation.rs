//! Per-route validation pipelines.
//!
//! Each route declares an ordered list of named checks; the runner executes
//! them in declaration order and stops at the first failure, returning a
//! field-scoped, machine-distinguishable message. Checks come in two
//! flavors: synchronous field checks (format, presence, cross-field) and
//! store-backed asynchronous checks that must complete before the handler
//! runs. A check list is built per request, so concurrent requests share no
//! validation state.

use chrono::NaiveDate;
use futures::future::BoxFuture;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::auth::messages;
use crate::auth::models::{
    ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, VerifyEmailRequest, VerifyForgotPasswordRequest,
};
use crate::auth::token::{TokenClaims, TokenCodec, TokenKind};
use crate::auth::user::User;
use crate::errors::{AuthErrorType, GatehouseError, Result};
use crate::storage::repositories::{RefreshTokenRepository, UserRepository};

lazy_static! {
    // Email validation: basic RFC 5322 compliant pattern
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("EMAIL_REGEX should be a valid regex pattern");
}

/// Minimum password length requirement
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length to prevent DoS
const MAX_PASSWORD_LENGTH: usize = 128;

/// A single named validation check.
pub struct Check<'a> {
    name: &'static str,
    kind: CheckKind<'a>,
}

enum CheckKind<'a> {
    /// Pure syntactic or cross-field check
    Sync(Box<dyn FnOnce() -> Result<()> + Send + 'a>),
    /// Store-dependent check; awaited before the handler runs
    Store(BoxFuture<'a, Result<()>>),
}

impl<'a> Check<'a> {
    pub fn sync(name: &'static str, run: impl FnOnce() -> Result<()> + Send + 'a) -> Self {
        Self { name, kind: CheckKind::Sync(Box::new(run)) }
    }

    pub fn store(
        name: &'static str,
        run: impl std::future::Future<Output = Result<()>> + Send + 'a,
    ) -> Self {
        Self { name, kind: CheckKind::Store(Box::pin(run)) }
    }
}

/// Run checks in declaration order, stopping at the first failure.
pub async fn run_checks(checks: Vec<Check<'_>>) -> Result<()> {
    for check in checks {
        let outcome = match check.kind {
            CheckKind::Sync(run) => run(),
            CheckKind::Store(run) => run.await,
        };

        if let Err(err) = outcome {
            debug!(check = check.name, error = %err, "validation check failed");
            return Err(err);
        }
    }

    Ok(())
}

// Field validators

/// Reject empty or whitespace-only values
pub fn require(field: &'static str, value: &str, code: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatehouseError::validation_field(code, field));
    }
    Ok(())
}

/// Validate email format
pub fn check_email_format(email: &str) -> Result<()> {
    if EMAIL_REGEX.is_match(email.trim()) {
        Ok(())
    } else {
        Err(GatehouseError::validation_field(messages::EMAIL_IS_INVALID, "email"))
    }
}

/// Validate password strength: 8-128 characters with at least one
/// uppercase letter, one lowercase letter, one digit, and one symbol.
pub fn check_password_strength(field: &'static str, password: &str) -> Result<()> {
    let strong = password.len() >= MIN_PASSWORD_LENGTH
        && password.len() <= MAX_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_numeric())
        && password.chars().any(|c| !c.is_alphanumeric());

    if strong {
        Ok(())
    } else {
        Err(GatehouseError::validation_field(messages::PASSWORD_MUST_BE_STRONG, field))
    }
}

/// Cross-field check: confirm_password must equal password
pub fn check_passwords_match(password: &str, confirm_password: &str) -> Result<()> {
    if password == confirm_password {
        Ok(())
    } else {
        Err(GatehouseError::validation_field(
            messages::CONFIRM_PASSWORD_NOT_MATCH,
            "confirm_password",
        ))
    }
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`)
pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        GatehouseError::validation_field(messages::DATE_OF_BIRTH_MUST_BE_ISO8061, "date_of_birth")
    })
}

/// Re-classify a codec failure under a route-specific message, preserving
/// the expired/invalid distinction for callers.
fn map_token_error(err: GatehouseError, invalid_code: &'static str) -> GatehouseError {
    match err {
        expired @ GatehouseError::Auth { error_type: AuthErrorType::ExpiredToken, .. } => expired,
        _ => GatehouseError::auth(invalid_code, AuthErrorType::InvalidToken),
    }
}

// Per-route pipelines

/// Registration: syntactic checks in declaration order, then the
/// store-backed duplicate-email check.
pub async fn validate_register(
    request: &RegisterRequest,
    users: &dyn UserRepository,
) -> Result<()> {
    let email = User::normalize_email(&request.email);

    let checks = vec![
        Check::sync("name_required", || {
            require("name", &request.name, messages::NAME_IS_REQUIRED)
        }),
        Check::sync("email_required", || {
            require("email", &request.email, messages::EMAIL_IS_REQUIRED)
        }),
        Check::sync("email_format", || check_email_format(&request.email)),
        Check::store("email_not_registered", async move {
            match users.get_user_by_email(&email).await? {
                Some(_) => Err(GatehouseError::validation_field(
                    messages::EMAIL_ALREADY_EXISTS,
                    "email",
                )),
                None => Ok(()),
            }
        }),
        Check::sync("password_required", || {
            require("password", &request.password, messages::PASSWORD_IS_REQUIRED)
        }),
        Check::sync("password_strength", || {
            check_password_strength("password", &request.password)
        }),
        Check::sync("confirm_password_required", || {
            require(
                "confirm_password",
                &request.confirm_password,
                messages::CONFIRM_PASSWORD_IS_REQUIRED,
            )
        }),
        Check::sync("confirm_password_match", || {
            check_passwords_match(&request.password, &request.confirm_password)
        }),
        Check::sync("date_of_birth_iso8601", || {
            parse_date_of_birth(&request.date_of_birth).map(|_| ())
        }),
    ];

    run_checks(checks).await
}

/// Login: presence and format only; credential matching happens in the
/// service so unknown-email and wrong-password are indistinguishable.
pub async fn validate_login(request: &LoginRequest) -> Result<()> {
    let checks = vec![
        Check::sync("email_required", || {
            require("email", &request.email, messages::EMAIL_IS_REQUIRED)
        }),
        Check::sync("email_format", || check_email_format(&request.email)),
        Check::sync("password_required", || {
            require("password", &request.password, messages::PASSWORD_IS_REQUIRED)
        }),
    ];

    run_checks(checks).await
}

/// Refresh-token routes (logout and refresh): the token must decode against
/// the refresh secret with the refresh kind tag AND be present in the
/// store. Returns the decoded claims for the handler.
pub async fn validate_refresh_token(
    request: &RefreshTokenRequest,
    codec: &TokenCodec,
    refresh_tokens: &dyn RefreshTokenRepository,
) -> Result<TokenClaims> {
    let checks = vec![Check::sync("refresh_token_required", || {
        require(
            "refresh_token",
            &request.refresh_token,
            messages::REFRESH_TOKEN_IS_REQUIRED,
        )
    })];
    run_checks(checks).await?;

    let claims = codec
        .verify(&request.refresh_token, TokenKind::Refresh)
        .map_err(|err| map_token_error(err, messages::REFRESH_TOKEN_INVALID))?;

    if refresh_tokens.find_token(&request.refresh_token).await?.is_none() {
        return Err(GatehouseError::auth(
            messages::REFRESH_TOKEN_IS_USED_OR_NOT_EXIST,
            AuthErrorType::InvalidToken,
        ));
    }

    Ok(claims)
}

/// Email verification: presence plus decode against the email-verify
/// secret. Store state (already verified or not) is the service's call.
pub async fn validate_verify_email(
    request: &VerifyEmailRequest,
    codec: &TokenCodec,
) -> Result<TokenClaims> {
    let checks = vec![Check::sync("email_verify_token_required", || {
        require(
            "email_verify_token",
            &request.email_verify_token,
            messages::EMAIL_VERIFY_TOKEN_IS_REQUIRED,
        )
    })];
    run_checks(checks).await?;

    codec
        .verify(&request.email_verify_token, TokenKind::EmailVerify)
        .map_err(|err| map_token_error(err, messages::EMAIL_VERIFY_TOKEN_INVALID))
}

/// Forgot password: presence and format of the email.
pub async fn validate_forgot_password(request: &ForgotPasswordRequest) -> Result<()> {
    let checks = vec![
        Check::sync("email_required", || {
            require("email", &request.email, messages::EMAIL_IS_REQUIRED)
        }),
        Check::sync("email_format", || check_email_format(&request.email)),
    ];

    run_checks(checks).await
}

/// Forgot-password token verification: presence plus decode. The equality
/// check against the stored token is the service's revocation mechanism.
pub async fn validate_verify_forgot_password(
    request: &VerifyForgotPasswordRequest,
    codec: &TokenCodec,
) -> Result<TokenClaims> {
    let checks = vec![Check::sync("forgot_password_token_required", || {
        require(
            "forgot_password_token",
            &request.forgot_password_token,
            messages::FORGOT_PASSWORD_TOKEN_IS_REQUIRED,
        )
    })];
    run_checks(checks).await?;

    codec
        .verify(&request.forgot_password_token, TokenKind::ForgotPassword)
        .map_err(|err| map_token_error(err, messages::FORGOT_PASSWORD_TOKEN_IS_INVALID))
}

/// Password reset: token checks as above plus strength and cross-field
/// checks on the replacement password.
pub async fn validate_reset_password(
    request: &ResetPasswordRequest,
    codec: &TokenCodec,
) -> Result<TokenClaims> {
    let checks = vec![
        Check::sync("forgot_password_token_required", || {
            require(
                "forgot_password_token",
                &request.forgot_password_token,
                messages::FORGOT_PASSWORD_TOKEN_IS_REQUIRED,
            )
        }),
        Check::sync("password_required", || {
            require("password", &request.password, messages::PASSWORD_IS_REQUIRED)
        }),
        Check::sync("password_strength", || {
            check_password_strength("password", &request.password)
        }),
        Check::sync("confirm_password_match", || {
            check_passwords_match(&request.password, &request.confirm_password)
        }),
    ];
    run_checks(checks).await?;

    codec
        .verify(&request.forgot_password_token, TokenKind::ForgotPassword)
        .map_err(|err| map_token_error(err, messages::FORGOT_PASSWORD_TOKEN_IS_INVALID))
}
