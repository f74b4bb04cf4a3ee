//! Focused repository modules for the credential store.

pub mod refresh_token;
pub mod user;

pub use refresh_token::{
    NewRefreshToken, RefreshTokenRecord, RefreshTokenRepository, SqlxRefreshTokenRepository,
};
pub use user::{SqlxUserRepository, UserRepository};
