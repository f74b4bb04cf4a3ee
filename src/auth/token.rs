//! Signed, expiring tokens for the four authentication flows.
//!
//! Each token kind signs with its own secret, so a token minted for one
//! purpose never verifies against another kind's key even before the
//! embedded kind tag is checked. The codec is stateless: whether a refresh
//! token is still live is the store's call, not this module's.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::config::AuthConfig;
use crate::errors::{AuthErrorType, GatehouseError, Result};

/// The four token kinds minted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    EmailVerify,
    ForgotPassword,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
            TokenKind::EmailVerify => "email_verify",
            TokenKind::ForgotPassword => "forgot_password",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JWT claims carried by every Gatehouse token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier)
    pub sub: String,
    /// Token kind tag; checked against the expected kind on verify
    pub kind: TokenKind,
    /// Unique token id; keeps two same-second mints for one subject from
    /// serializing to identical strings (refresh tokens are stored keyed
    /// by the literal string)
    pub jti: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

struct KindKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KindKeys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Stateless encoder/decoder for all four token kinds.
pub struct TokenCodec {
    access: KindKeys,
    refresh: KindKeys,
    email_verify: KindKeys,
    forgot_password: KindKeys,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the authentication configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            access: KindKeys::new(
                &config.access_token_secret,
                Duration::minutes(config.access_token_ttl_minutes),
            ),
            refresh: KindKeys::new(
                &config.refresh_token_secret,
                Duration::days(config.refresh_token_ttl_days),
            ),
            email_verify: KindKeys::new(
                &config.email_verify_token_secret,
                Duration::hours(config.email_verify_token_ttl_hours),
            ),
            forgot_password: KindKeys::new(
                &config.forgot_password_token_secret,
                Duration::hours(config.forgot_password_token_ttl_hours),
            ),
            validation: Validation::default(),
        }
    }

    fn keys(&self, kind: TokenKind) -> &KindKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
            TokenKind::EmailVerify => &self.email_verify,
            TokenKind::ForgotPassword => &self.forgot_password,
        }
    }

    /// Issue a token of the given kind for a subject, with the kind's
    /// configured TTL.
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String> {
        let keys = self.keys(kind);
        let now = Utc::now();

        let claims = TokenClaims {
            sub: subject.to_string(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + keys.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| GatehouseError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token against the given kind's secret and return its claims.
    ///
    /// Fails closed on signature mismatch, malformed input, expiry, and a
    /// kind tag that does not match `kind` (the last is unreachable when
    /// secrets are distinct, but it is checked regardless).
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims> {
        let keys = self.keys(kind);

        let data = decode::<TokenClaims>(token, &keys.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    GatehouseError::auth("Token has expired", AuthErrorType::ExpiredToken)
                }
                _ => GatehouseError::auth("Invalid token", AuthErrorType::InvalidToken),
            })?;

        if data.claims.kind != kind {
            return Err(GatehouseError::auth(
                format!("Expected {} token, got {}", kind, data.claims.kind),
                AuthErrorType::InvalidToken,
            ));
        }

        Ok(data.claims)
    }
}
