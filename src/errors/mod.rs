//! # Error Handling
//!
//! Error types for the Gatehouse authentication service using `thiserror`.
//! Every failure surfaced to a caller is one of these variants; handlers
//! translate them into HTTP responses via `api::error::ApiError`.

use std::fmt;

/// Custom result type for Gatehouse operations
pub type Result<T> = std::result::Result<T, GatehouseError>;

/// Main error type for the Gatehouse service
#[derive(thiserror::Error, Debug)]
pub enum GatehouseError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Validation errors, optionally scoped to a request field
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Authentication and authorization errors
    #[error("Authentication error: {message}")]
    Auth {
        message: String,
        error_type: AuthErrorType,
    },

    /// Internal server errors
    #[error("Internal server error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} '{id}'")]
    NotFound {
        resource_type: String,
        id: String,
    },

    /// Resource conflict errors (e.g. already exists)
    #[error("Resource conflict: {message}")]
    Conflict {
        message: String,
        resource_type: String,
    },
}

/// Authentication error subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorType {
    InvalidToken,
    ExpiredToken,
    MissingToken,
    InvalidCredentials,
    InsufficientPermissions,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorType::InvalidToken => write!(f, "invalid_token"),
            AuthErrorType::ExpiredToken => write!(f, "expired_token"),
            AuthErrorType::MissingToken => write!(f, "missing_token"),
            AuthErrorType::InvalidCredentials => write!(f, "invalid_credentials"),
            AuthErrorType::InsufficientPermissions => write!(f, "insufficient_permissions"),
        }
    }
}

impl GatehouseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error scoped to a field
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource_type: R) -> Self {
        Self::Conflict { message: message.into(), resource_type: resource_type.into() }
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatehouseError::Config { .. } => 500,
            GatehouseError::Database { .. } => 500,
            GatehouseError::Io { .. } => 500,
            GatehouseError::Serialization { .. } => 400,
            GatehouseError::Validation { .. } => 422,
            GatehouseError::Auth { error_type, .. } => match error_type {
                AuthErrorType::InsufficientPermissions => 403,
                _ => 401,
            },
            GatehouseError::Internal { .. } => 500,
            GatehouseError::NotFound { .. } => 404,
            GatehouseError::Conflict { .. } => 409,
        }
    }
}

// Error conversions for common external error types

impl From<sqlx::Error> for GatehouseError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<std::io::Error> for GatehouseError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for GatehouseError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<config::ConfigError> for GatehouseError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for GatehouseError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = GatehouseError::config("Test configuration error");
        assert!(matches!(error, GatehouseError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_validation_error_field() {
        let error = GatehouseError::validation_field("EMAIL_IS_INVALID", "email");
        assert!(matches!(error, GatehouseError::Validation { .. }));
        if let GatehouseError::Validation { field, .. } = error {
            assert_eq!(field, Some("email".to_string()));
        }
    }

    #[test]
    fn test_auth_error() {
        let error = GatehouseError::auth("Invalid token", AuthErrorType::InvalidToken);
        assert!(matches!(error, GatehouseError::Auth { .. }));
        if let GatehouseError::Auth { error_type, .. } = error {
            assert_eq!(error_type, AuthErrorType::InvalidToken);
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatehouseError::validation("test").status_code(), 422);
        assert_eq!(GatehouseError::auth("test", AuthErrorType::InvalidToken).status_code(), 401);
        assert_eq!(
            GatehouseError::auth("test", AuthErrorType::InsufficientPermissions).status_code(),
            403
        );
        assert_eq!(GatehouseError::not_found("user", "test").status_code(), 404);
        assert_eq!(GatehouseError::conflict("test", "user").status_code(), 409);
        assert_eq!(GatehouseError::internal("test").status_code(), 500);
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatehouseError = io_error.into();
        assert!(matches!(err, GatehouseError::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GatehouseError = json_error.into();
        assert!(matches!(err, GatehouseError::Serialization { .. }));
    }

    #[test]
    fn test_auth_error_type_display() {
        assert_eq!(AuthErrorType::InvalidToken.to_string(), "invalid_token");
        assert_eq!(AuthErrorType::ExpiredToken.to_string(), "expired_token");
        assert_eq!(AuthErrorType::MissingToken.to_string(), "missing_token");
        assert_eq!(AuthErrorType::InvalidCredentials.to_string(), "invalid_credentials");
        assert_eq!(
            AuthErrorType::InsufficientPermissions.to_string(),
            "insufficient_permissions"
        );
    }
}
