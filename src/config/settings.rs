//! # Configuration Settings
//!
//! Defines the configuration structure for the Gatehouse service.

use crate::errors::{GatehouseError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from an optional `gatehouse.toml` file plus
    /// `GATEHOUSE_`-prefixed environment variables, then validate it.
    ///
    /// Environment variables override file values; nested fields use `__`
    /// as separator (e.g. `GATEHOUSE_AUTH__ACCESS_TOKEN_SECRET`).
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("gatehouse").required(false))
            .add_source(config::Environment::with_prefix("GATEHOUSE").separator("__"))
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(GatehouseError::from)?;
        self.validate_custom()?;
        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite://") {
            return Err(GatehouseError::validation(
                "Database URL must start with 'sqlite://'",
            ));
        }

        let secrets = [
            self.auth.access_token_secret.as_str(),
            self.auth.refresh_token_secret.as_str(),
            self.auth.email_verify_token_secret.as_str(),
            self.auth.forgot_password_token_secret.as_str(),
        ];

        for secret in secrets {
            if secret.len() < 32 {
                return Err(GatehouseError::validation(
                    "Token secrets must be at least 32 characters long",
                ));
            }
        }

        // Each token kind signs with its own secret; sharing one would
        // collapse the cross-kind rejection guarantee.
        for i in 0..secrets.len() {
            for j in (i + 1)..secrets.len() {
                if secrets[i] == secrets[j] {
                    return Err(GatehouseError::validation(
                        "Token secrets must be pairwise distinct across token kinds",
                    ));
                }
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            timeout_seconds: 30,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/gatehouse.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a SQLite configuration
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite://")
    }
}

/// Observability configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing service name
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "gatehouse".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

/// Authentication configuration: one signing secret and one TTL per token kind
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AuthConfig {
    /// Signing secret for access tokens
    #[validate(length(min = 32, message = "Access token secret must be at least 32 characters"))]
    pub access_token_secret: String,

    /// Signing secret for refresh tokens
    #[validate(length(min = 32, message = "Refresh token secret must be at least 32 characters"))]
    pub refresh_token_secret: String,

    /// Signing secret for email verification tokens
    #[validate(length(
        min = 32,
        message = "Email verify token secret must be at least 32 characters"
    ))]
    pub email_verify_token_secret: String,

    /// Signing secret for forgot-password tokens
    #[validate(length(
        min = 32,
        message = "Forgot password token secret must be at least 32 characters"
    ))]
    pub forgot_password_token_secret: String,

    /// Access token lifetime in minutes
    #[validate(range(
        min = 1,
        max = 1440,
        message = "Access token TTL must be between 1 minute and 24 hours"
    ))]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[validate(range(
        min = 1,
        max = 365,
        message = "Refresh token TTL must be between 1 and 365 days"
    ))]
    pub refresh_token_ttl_days: i64,

    /// Email verification token lifetime in hours
    #[validate(range(
        min = 1,
        max = 168,
        message = "Email verify token TTL must be between 1 hour and 7 days"
    ))]
    pub email_verify_token_ttl_hours: i64,

    /// Forgot-password token lifetime in hours
    #[validate(range(
        min = 1,
        max = 48,
        message = "Forgot password token TTL must be between 1 and 48 hours"
    ))]
    pub forgot_password_token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: "gatehouse-dev-access-secret-change-in-production".to_string(),
            refresh_token_secret: "gatehouse-dev-refresh-secret-change-in-production".to_string(),
            email_verify_token_secret: "gatehouse-dev-email-verify-secret-change-in-prod"
                .to_string(),
            forgot_password_token_secret: "gatehouse-dev-forgot-password-secret-change-me"
                .to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            email_verify_token_ttl_hours: 24,
            forgot_password_token_ttl_hours: 2,
        }
    }
}
