//! # Gatehouse
//!
//! Gatehouse is the authentication service of the storefront backend. It
//! owns the issuance, verification, and lifecycle of four token kinds
//! (access, refresh, email-verification, forgot-password), the persistent
//! credential store behind them, and the validation pipelines that gate
//! every route.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request → ValidationPipeline → RouteHandlers → AuthService
//!                                                        ↓
//!                                          CredentialStore / TokenCodec
//! ```
//!
//! ## Core Components
//!
//! - **TokenCodec** (`auth::token`): stateless JWT encode/decode, one
//!   signing secret and TTL per token kind
//! - **CredentialStore** (`storage`): SQLx/SQLite repositories for user
//!   accounts and currently-valid refresh tokens
//! - **AuthService** (`auth::service`): registration, login, logout,
//!   refresh rotation, email verification, and the password-reset flow
//! - **ValidationPipeline** (`auth::validation`): ordered, named,
//!   first-failure check lists run before each handler
//! - **API layer** (`api`): Axum router, thin handlers, error mapping

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{GatehouseError, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "gatehouse");
    }
}
