//! # Configuration Management
//!
//! Loads and validates the Gatehouse configuration. The configuration is
//! constructed once at process start (`AppConfig::load`) and handed to the
//! components that need it; business logic never reads the environment on
//! its own.

mod settings;

pub use settings::{
    AppConfig, AuthConfig, DatabaseConfig, ObservabilityConfig, ServerConfig,
};
