//! Authentication module entry point.
//!
//! Exposes the token codec, password hashing, the account service, the
//! per-route validation pipelines, and the access-token extractor.

pub mod extract;
pub mod hashing;
pub mod messages;
pub mod models;
pub mod service;
pub mod token;
pub mod user;
pub mod validation;

pub use extract::AccessClaims;
pub use service::AuthService;
pub use token::{TokenClaims, TokenCodec, TokenKind};
pub use user::{User, VerifyStatus};
