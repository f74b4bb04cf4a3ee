//! Axum extractor for access-token authentication.
//!
//! Protected handlers take [`AccessClaims`] as an argument; the extractor
//! pulls the bearer credential from the `Authorization` header and decodes
//! it against the access secret. The decoded payload reaches the handler
//! through its signature instead of middleware mutating shared request
//! state. Access tokens are self-contained: no store lookup happens here,
//! unlike refresh tokens which are additionally checked against the store.

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::messages;
use crate::auth::token::{TokenClaims, TokenKind};
use crate::domain::UserId;

/// Decoded access-token payload for the current request.
#[derive(Debug, Clone)]
pub struct AccessClaims(pub TokenClaims);

impl AccessClaims {
    /// The authenticated user's id.
    pub fn user_id(&self) -> UserId {
        UserId::from_str_unchecked(&self.0.sub)
    }
}

impl FromRequestParts<AppState> for AccessClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        let token = match header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => token.trim(),
            _ => {
                return Err(ApiError::unauthorized(messages::ACCESS_TOKEN_IS_REQUIRED));
            }
        };

        let claims = state.codec.verify(token, TokenKind::Access).map_err(|err| {
            warn!(error = %err, "access token verification failed");
            ApiError::from(err)
        })?;

        Ok(AccessClaims(claims))
    }
}
