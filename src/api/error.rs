use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::error;

use crate::auth::messages;
use crate::errors::{AuthErrorType, GatehouseError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    UnprocessableEntity { message: String, field: Option<String> },
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden<S: Into<String>>(msg: S) -> Self {
        ApiError::Forbidden(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::UnprocessableEntity { .. } => "validation_failed",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        };

        let (message, field) = match self {
            ApiError::UnprocessableEntity { message, field } => (message, field),
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => (msg, None),
        };

        (status, Json(ErrorBody { error: error_kind, message, field })).into_response()
    }
}

impl From<GatehouseError> for ApiError {
    fn from(err: GatehouseError) -> Self {
        match err {
            GatehouseError::Validation { message, field } => {
                ApiError::UnprocessableEntity { message, field }
            }
            GatehouseError::Auth { message, error_type } => match error_type {
                AuthErrorType::InsufficientPermissions => ApiError::Forbidden(message),
                _ => ApiError::Unauthorized(message),
            },
            GatehouseError::NotFound { resource_type, id } => {
                if resource_type == "User" {
                    ApiError::NotFound(messages::USER_NOT_FOUND.to_string())
                } else {
                    ApiError::NotFound(format!("{} '{}' not found", resource_type, id))
                }
            }
            GatehouseError::Conflict { message, .. } => ApiError::Conflict(message),
            GatehouseError::Serialization { context, .. } => ApiError::BadRequest(context),
            GatehouseError::Database { source, context } => {
                // The UNIQUE(users.email) constraint is the only one a
                // request can trip; surface it as the duplicate-email
                // conflict instead of a 500.
                if let Some(db_err) = source.as_database_error() {
                    if db_err.is_unique_violation() {
                        return ApiError::Conflict(messages::EMAIL_ALREADY_EXISTS.to_string());
                    }
                }
                error!(error = %source, context = %context, "database error");
                ApiError::Internal("Internal server error".to_string())
            }
            other => {
                error!(error = %other, "unhandled internal error");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_422_with_field() {
        let err = ApiError::from(GatehouseError::validation_field("EMAIL_IS_INVALID", "email"));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            ApiError::UnprocessableEntity { message, field } => {
                assert_eq!(message, "EMAIL_IS_INVALID");
                assert_eq!(field.as_deref(), Some("email"));
            }
            other => panic!("expected 422 variant, got {:?}", other),
        }
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        let unauthorized =
            ApiError::from(GatehouseError::auth("nope", AuthErrorType::InvalidToken));
        assert_eq!(unauthorized.status_code(), StatusCode::UNAUTHORIZED);

        let forbidden = ApiError::from(GatehouseError::auth(
            "banned",
            AuthErrorType::InsufficientPermissions,
        ));
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn user_not_found_uses_wire_code() {
        let err = ApiError::from(GatehouseError::not_found("User", "some-id"));
        match err {
            ApiError::NotFound(message) => assert_eq!(message, messages::USER_NOT_FOUND),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = ApiError::from(GatehouseError::internal("secret connection string"));
        match err {
            ApiError::Internal(message) => assert_eq!(message, "Internal server error"),
            other => panic!("expected internal, got {:?}", other),
        }
    }
}
