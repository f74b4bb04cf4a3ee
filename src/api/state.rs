//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::auth::{AuthService, TokenCodec};
use crate::config::AppConfig;
use crate::storage::repositories::{RefreshTokenRepository, UserRepository};
use crate::storage::{DbPool, SqlxRefreshTokenRepository, SqlxUserRepository};

/// Everything a handler or extractor needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub codec: Arc<TokenCodec>,
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: DbPool) -> Self {
        let codec = Arc::new(TokenCodec::from_config(&config.auth));
        let users: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool.clone()));
        let refresh_tokens: Arc<dyn RefreshTokenRepository> =
            Arc::new(SqlxRefreshTokenRepository::new(pool));

        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            refresh_tokens.clone(),
            codec.clone(),
        ));

        Self { auth_service, codec, users, refresh_tokens }
    }
}
