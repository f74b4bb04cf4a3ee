//! Core business logic for the authentication flows.
//!
//! The service exclusively owns the rules for when each token kind is
//! minted and revoked. Handlers validate input shape first (see
//! `auth::validation`), then delegate here; this layer re-checks anything
//! that decides an outcome, so a race between validation and execution can
//! never mint or revoke the wrong token.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing;
use crate::auth::messages;
use crate::auth::models::{EmailVerification, RegisterRequest, RegisteredUser, TokenPair};
use crate::auth::token::{TokenCodec, TokenKind};
use crate::auth::user::{NewUser, UpdateUser, User, VerifyStatus};
use crate::auth::validation;
use crate::domain::UserId;
use crate::errors::{AuthErrorType, GatehouseError, Result};
use crate::storage::repositories::{NewRefreshToken, RefreshTokenRepository, UserRepository};
use crate::storage::{SqlxRefreshTokenRepository, SqlxUserRepository};

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used, we still run Argon2 verification
/// against this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Service for account registration, login, and token lifecycle management.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self { users, refresh_tokens, codec }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, codec: Arc<TokenCodec>) -> Self {
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxRefreshTokenRepository::new(pool)),
            codec,
        )
    }

    /// Register a new account.
    ///
    /// Creates the user Unverified with a freshly minted email-verify token
    /// stored on the record, then issues and persists an access/refresh
    /// pair. The store's UNIQUE email constraint backstops the pipeline's
    /// duplicate check.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisteredUser> {
        let email = User::normalize_email(&request.email);
        let date_of_birth = validation::parse_date_of_birth(&request.date_of_birth)?;
        let password_hash = hashing::hash_password(&request.password)?;

        let user_id = UserId::new();
        let email_verify_token = self.codec.issue(user_id.as_str(), TokenKind::EmailVerify)?;

        let user = self
            .users
            .create_user(NewUser {
                id: user_id,
                name: request.name.trim().to_string(),
                email,
                password_hash,
                date_of_birth,
                verify_status: VerifyStatus::Unverified,
                email_verify_token: Some(email_verify_token),
            })
            .await?;

        let tokens = self.issue_token_pair(&user.id).await?;

        info!(user_id = %user.id, "user registered");

        Ok(RegisteredUser { user_id: user.id, tokens })
    }

    /// Authenticate with email and password, minting a new token pair.
    ///
    /// Unknown email and wrong password produce the same error; a dummy
    /// Argon2 verification keeps the unknown-email path from returning
    /// measurably faster.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let email = User::normalize_email(email);

        let (user, password_hash) = match self.users.get_user_with_password(&email).await? {
            Some(found) => found,
            None => {
                if let Err(e) = hashing::verify_password(password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                warn!(email = %email, "login attempt for non-existent user");
                return Err(GatehouseError::auth(
                    messages::EMAIL_OR_PASSWORD_INCORRECT,
                    AuthErrorType::InvalidCredentials,
                ));
            }
        };

        if !hashing::verify_password(password, &password_hash)? {
            warn!(user_id = %user.id, "login attempt with incorrect password");
            return Err(GatehouseError::auth(
                messages::EMAIL_OR_PASSWORD_INCORRECT,
                AuthErrorType::InvalidCredentials,
            ));
        }

        self.reject_banned(&user)?;

        let tokens = self.issue_token_pair(&user.id).await?;

        info!(user_id = %user.id, "user logged in");
        Ok(tokens)
    }

    /// Invalidate a refresh token.
    ///
    /// Store absence is authoritative: a token that was already consumed or
    /// never persisted is rejected even if its signature still verifies.
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        if !self.refresh_tokens.delete_token(refresh_token).await? {
            return Err(GatehouseError::auth(
                messages::REFRESH_TOKEN_IS_USED_OR_NOT_EXIST,
                AuthErrorType::InvalidToken,
            ));
        }

        info!("refresh token revoked");
        Ok(())
    }

    /// Rotate a refresh token: consume the old one, mint a new pair.
    ///
    /// The old token is deleted before the new pair is persisted, so two
    /// concurrent calls with the same token resolve first-deleter-wins and
    /// the loser sees the token as already used.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self
            .codec
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|err| match err {
                expired @ GatehouseError::Auth {
                    error_type: AuthErrorType::ExpiredToken, ..
                } => expired,
                _ => GatehouseError::auth(
                    messages::REFRESH_TOKEN_INVALID,
                    AuthErrorType::InvalidToken,
                ),
            })?;

        // A ban must not be outlived by an outstanding refresh token.
        let user = self.load_user(&claims.sub).await?;
        self.reject_banned(&user)?;

        if !self.refresh_tokens.delete_token(refresh_token).await? {
            return Err(GatehouseError::auth(
                messages::REFRESH_TOKEN_IS_USED_OR_NOT_EXIST,
                AuthErrorType::InvalidToken,
            ));
        }

        let tokens = self.issue_token_pair(&user.id).await?;

        info!(user_id = %user.id, "refresh token rotated");
        Ok(tokens)
    }

    /// Consume an email-verify token, transitioning Unverified → Verified.
    ///
    /// Re-submission after verification reports `AlreadyVerified` rather
    /// than erroring; the transition itself happens at most once.
    #[instrument(skip(self, email_verify_token))]
    pub async fn verify_email(&self, email_verify_token: &str) -> Result<EmailVerification> {
        let claims = self
            .codec
            .verify(email_verify_token, TokenKind::EmailVerify)
            .map_err(|err| match err {
                expired @ GatehouseError::Auth {
                    error_type: AuthErrorType::ExpiredToken, ..
                } => expired,
                _ => GatehouseError::auth(
                    messages::EMAIL_VERIFY_TOKEN_INVALID,
                    AuthErrorType::InvalidToken,
                ),
            })?;

        let user = self.load_user(&claims.sub).await?;
        self.reject_banned(&user)?;

        if user.is_verified() || user.email_verify_token.is_none() {
            return Ok(EmailVerification::AlreadyVerified);
        }

        self.users
            .update_user(
                &user.id,
                UpdateUser {
                    verify_status: Some(VerifyStatus::Verified),
                    email_verify_token: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user.id, "email verified");
        Ok(EmailVerification::Verified)
    }

    /// Mint a fresh email-verify token for an unverified account,
    /// overwriting the stored one.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn resend_verify_email(&self, user_id: &UserId) -> Result<EmailVerification> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| GatehouseError::not_found("User", user_id.to_string()))?;
        self.reject_banned(&user)?;

        if user.is_verified() {
            return Ok(EmailVerification::AlreadyVerified);
        }

        let token = self.codec.issue(user.id.as_str(), TokenKind::EmailVerify)?;
        self.users
            .update_user(
                &user.id,
                UpdateUser { email_verify_token: Some(Some(token)), ..Default::default() },
            )
            .await?;

        info!(user_id = %user.id, "email verify token re-issued");
        Ok(EmailVerification::Verified)
    }

    /// Start the password-reset flow: mint a forgot-password token and
    /// store it on the user record, silently invalidating any prior one.
    ///
    /// Returns the token; delivering it to the user's mailbox is the mail
    /// pipeline's job, not this service's.
    #[instrument(skip(self, email), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<String> {
        let email = User::normalize_email(email);

        let user = self
            .users
            .get_user_by_email(&email)
            .await?
            .ok_or_else(|| GatehouseError::not_found("User", email.clone()))?;
        self.reject_banned(&user)?;

        let token = self.codec.issue(user.id.as_str(), TokenKind::ForgotPassword)?;
        self.users
            .update_user(
                &user.id,
                UpdateUser {
                    forgot_password_token: Some(Some(token.clone())),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user.id, "forgot password token issued");
        Ok(token)
    }

    /// Check a forgot-password token without consuming it.
    ///
    /// The token must decode AND exactly equal the one currently stored on
    /// the user record; the equality check is the sole revocation
    /// mechanism, so a newer forgot-password request invalidates older
    /// tokens before they expire.
    #[instrument(skip(self, forgot_password_token))]
    pub async fn verify_forgot_password(&self, forgot_password_token: &str) -> Result<UserId> {
        let user = self.forgot_password_token_owner(forgot_password_token).await?;
        Ok(user.id)
    }

    /// Consume a forgot-password token and set a new password.
    #[instrument(skip(self, forgot_password_token, new_password))]
    pub async fn reset_password(
        &self,
        forgot_password_token: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self.forgot_password_token_owner(forgot_password_token).await?;

        let password_hash = hashing::hash_password(new_password)?;
        self.users
            .update_user(
                &user.id,
                UpdateUser {
                    password_hash: Some(password_hash),
                    forgot_password_token: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Fetch the account for a verified access-token subject.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: &UserId) -> Result<User> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| GatehouseError::not_found("User", user_id.to_string()))?;
        self.reject_banned(&user)?;
        Ok(user)
    }

    // Private helpers

    async fn issue_token_pair(&self, user_id: &UserId) -> Result<TokenPair> {
        let access_token = self.codec.issue(user_id.as_str(), TokenKind::Access)?;
        let refresh_token = self.codec.issue(user_id.as_str(), TokenKind::Refresh)?;

        self.refresh_tokens
            .insert_token(NewRefreshToken {
                token: refresh_token.clone(),
                user_id: user_id.clone(),
            })
            .await?;

        Ok(TokenPair { access_token, refresh_token })
    }

    async fn load_user(&self, subject: &str) -> Result<User> {
        let user_id = UserId::from_str_unchecked(subject);
        self.users
            .get_user(&user_id)
            .await?
            .ok_or_else(|| GatehouseError::auth(messages::USER_NOT_FOUND, AuthErrorType::InvalidToken))
    }

    fn reject_banned(&self, user: &User) -> Result<()> {
        if user.is_banned() {
            warn!(user_id = %user.id, "rejected operation for banned account");
            return Err(GatehouseError::auth(
                messages::USER_BANNED,
                AuthErrorType::InsufficientPermissions,
            ));
        }
        Ok(())
    }

    async fn forgot_password_token_owner(&self, forgot_password_token: &str) -> Result<User> {
        let claims = self
            .codec
            .verify(forgot_password_token, TokenKind::ForgotPassword)
            .map_err(|err| match err {
                expired @ GatehouseError::Auth {
                    error_type: AuthErrorType::ExpiredToken, ..
                } => expired,
                _ => GatehouseError::auth(
                    messages::FORGOT_PASSWORD_TOKEN_IS_INVALID,
                    AuthErrorType::InvalidToken,
                ),
            })?;

        let user = self.load_user(&claims.sub).await?;
        self.reject_banned(&user)?;

        // Stored-token equality is the revocation mechanism: a newer
        // forgot-password request supersedes this token even if it has not
        // expired yet.
        if user.forgot_password_token.as_deref() != Some(forgot_password_token) {
            return Err(GatehouseError::auth(
                messages::FORGOT_PASSWORD_TOKEN_IS_INVALID,
                AuthErrorType::InvalidToken,
            ));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenCodec;
    use crate::config::AuthConfig;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_service() -> AuthService {
        // A single connection keeps the in-memory database shared across
        // the pool; separate connections to :memory: would each see their
        // own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        crate::storage::run_migrations(&pool).await.expect("migrations");

        let codec = Arc::new(TokenCodec::from_config(&AuthConfig::default()));
        AuthService::with_sqlx(pool, codec)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password: "Aa1!aaaa".to_string(),
            confirm_password: "Aa1!aaaa".to_string(),
            date_of_birth: "2000-01-01".to_string(),
        }
    }

    #[tokio::test]
    async fn register_issues_decodable_pair_with_matching_kinds() {
        let service = setup_service().await;
        let codec = TokenCodec::from_config(&AuthConfig::default());

        let registered = service.register(register_request("a@x.com")).await.unwrap();

        let access = codec.verify(&registered.tokens.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.sub, registered.user_id.as_str());
        assert_eq!(access.kind, TokenKind::Access);

        let refresh = codec.verify(&registered.tokens.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.sub, registered.user_id.as_str());
        assert_eq!(refresh.kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn login_succeeds_regardless_of_verification_status() {
        let service = setup_service().await;
        service.register(register_request("a@x.com")).await.unwrap();

        // Still unverified
        let tokens = service.login("a@x.com", "Aa1!aaaa").await.unwrap();
        assert!(!tokens.access_token.is_empty());
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials_uniformly() {
        let service = setup_service().await;
        service.register(register_request("a@x.com")).await.unwrap();

        let wrong_password = service.login("a@x.com", "Wrong1!aaaa").await.unwrap_err();
        let unknown_email = service.login("missing@x.com", "Aa1!aaaa").await.unwrap_err();

        for err in [wrong_password, unknown_email] {
            match err {
                GatehouseError::Auth { message, error_type } => {
                    assert_eq!(message, messages::EMAIL_OR_PASSWORD_INCORRECT);
                    assert_eq!(error_type, AuthErrorType::InvalidCredentials);
                }
                other => panic!("expected auth error, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn logout_is_at_most_once() {
        let service = setup_service().await;
        let registered = service.register(register_request("a@x.com")).await.unwrap();

        service.logout(&registered.tokens.refresh_token).await.unwrap();

        // The signature still verifies, but the store says no.
        let err = service.logout(&registered.tokens.refresh_token).await.unwrap_err();
        match err {
            GatehouseError::Auth { message, .. } => {
                assert_eq!(message, messages::REFRESH_TOKEN_IS_USED_OR_NOT_EXIST)
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refresh_rotates_and_invalidates_old_token() {
        let service = setup_service().await;
        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let old_refresh = registered.tokens.refresh_token.clone();

        let new_pair = service.refresh_token(&old_refresh).await.unwrap();
        assert_ne!(new_pair.refresh_token, old_refresh);

        let err = service.refresh_token(&old_refresh).await.unwrap_err();
        match err {
            GatehouseError::Auth { message, .. } => {
                assert_eq!(message, messages::REFRESH_TOKEN_IS_USED_OR_NOT_EXIST)
            }
            other => panic!("expected auth error, got {:?}", other),
        }

        // The rotated-in token works.
        service.refresh_token(&new_pair.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_rejects_wrong_kind_token() {
        let service = setup_service().await;
        let codec = TokenCodec::from_config(&AuthConfig::default());
        let registered = service.register(register_request("a@x.com")).await.unwrap();

        // A well-formed email-verify token presented to the refresh flow
        let email_token = codec.issue(registered.user_id.as_str(), TokenKind::EmailVerify).unwrap();
        let err = service.refresh_token(&email_token).await.unwrap_err();
        match err {
            GatehouseError::Auth { message, .. } => {
                assert_eq!(message, messages::REFRESH_TOKEN_INVALID)
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn verify_email_transitions_then_reports_already_verified() {
        let service = setup_service().await;
        let registered = service.register(register_request("a@x.com")).await.unwrap();

        let stored_token = service
            .get_user(&registered.user_id)
            .await
            .unwrap()
            .email_verify_token
            .expect("token stored on registration");

        assert_eq!(
            service.verify_email(&stored_token).await.unwrap(),
            EmailVerification::Verified
        );

        let user = service.get_user(&registered.user_id).await.unwrap();
        assert_eq!(user.verify_status, VerifyStatus::Verified);
        assert!(user.email_verify_token.is_none());

        // Same token again: explicit already-verified report, no error
        assert_eq!(
            service.verify_email(&stored_token).await.unwrap(),
            EmailVerification::AlreadyVerified
        );
    }

    #[tokio::test]
    async fn newer_forgot_password_request_supersedes_older_token() {
        let service = setup_service().await;
        service.register(register_request("a@x.com")).await.unwrap();

        let first = service.forgot_password("a@x.com").await.unwrap();
        let second = service.forgot_password("a@x.com").await.unwrap();

        // The superseded token decodes fine but no longer matches the record.
        let err = service.verify_forgot_password(&first).await.unwrap_err();
        match err {
            GatehouseError::Auth { message, .. } => {
                assert_eq!(message, messages::FORGOT_PASSWORD_TOKEN_IS_INVALID)
            }
            other => panic!("expected auth error, got {:?}", other),
        }

        service.verify_forgot_password(&second).await.unwrap();
    }

    #[tokio::test]
    async fn reset_password_consumes_token_and_changes_credentials() {
        let service = setup_service().await;
        service.register(register_request("a@x.com")).await.unwrap();

        let token = service.forgot_password("a@x.com").await.unwrap();
        service.reset_password(&token, "Bb2@bbbb").await.unwrap();

        // Old password no longer works, new one does
        assert!(service.login("a@x.com", "Aa1!aaaa").await.is_err());
        service.login("a@x.com", "Bb2@bbbb").await.unwrap();

        // Token was cleared on successful reset
        let err = service.reset_password(&token, "Cc3#cccc").await.unwrap_err();
        match err {
            GatehouseError::Auth { message, .. } => {
                assert_eq!(message, messages::FORGOT_PASSWORD_TOKEN_IS_INVALID)
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn forgot_password_unknown_email_is_not_found() {
        let service = setup_service().await;

        let err = service.forgot_password("missing@x.com").await.unwrap_err();
        assert!(matches!(err, GatehouseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn banned_account_cannot_refresh() {
        let service = setup_service().await;
        let registered = service.register(register_request("a@x.com")).await.unwrap();

        service
            .users
            .update_user(
                &registered.user_id,
                UpdateUser { verify_status: Some(VerifyStatus::Banned), ..Default::default() },
            )
            .await
            .unwrap();

        let err = service.refresh_token(&registered.tokens.refresh_token).await.unwrap_err();
        match err {
            GatehouseError::Auth { message, error_type } => {
                assert_eq!(message, messages::USER_BANNED);
                assert_eq!(error_type, AuthErrorType::InsufficientPermissions);
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn concurrent_refresh_of_same_token_has_exactly_one_winner() {
        let service = setup_service().await;
        let registered = service.register(register_request("a@x.com")).await.unwrap();
        let token = registered.tokens.refresh_token.clone();

        let (first, second) =
            tokio::join!(service.refresh_token(&token), service.refresh_token(&token));

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1, "exactly one refresh wins");

        for result in [first, second] {
            if let Err(err) = result {
                match err {
                    GatehouseError::Auth { message, .. } => {
                        assert_eq!(message, messages::REFRESH_TOKEN_IS_USED_OR_NOT_EXIST)
                    }
                    other => panic!("expected auth error, got {:?}", other),
                }
            }
        }
    }

    #[tokio::test]
    async fn resend_verify_email_overwrites_stored_token() {
        let service = setup_service().await;
        let registered = service.register(register_request("a@x.com")).await.unwrap();

        let before = service.get_user(&registered.user_id).await.unwrap().email_verify_token;
        service.resend_verify_email(&registered.user_id).await.unwrap();
        let after = service.get_user(&registered.user_id).await.unwrap().email_verify_token;

        assert!(before.is_some());
        assert!(after.is_some());
        assert_ne!(before, after);
    }
}
