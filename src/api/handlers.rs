//! Route handlers: thin adapters from HTTP requests to `AuthService` calls.
//!
//! Each handler runs its route's validation pipeline first, then delegates
//! to the service and shapes the JSON response. No business rules live
//! here.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::extract::AccessClaims;
use crate::auth::messages;
use crate::auth::models::{
    EmailVerification, ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, TokenPair, VerifyEmailRequest, VerifyForgotPasswordRequest,
};
use crate::auth::user::UserResponse;
use crate::auth::validation;

use super::error::ApiError;
use super::state::AppState;

/// Response carrying a message code and a freshly minted token pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub result: TokenPair,
}

/// Response carrying only a message code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}

/// Liveness probe response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 422, description = "Field validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validation::validate_register(&payload, state.users.as_ref()).await?;

    let registered = state.auth_service.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: messages::REGISTER_SUCCESS.to_string(),
            result: registered.tokens,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Email or password incorrect"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validation::validate_login(&payload).await?;

    let tokens = state.auth_service.login(&payload.email, &payload.password).await?;

    Ok(Json(AuthResponse { message: messages::LOGIN_SUCCESS.to_string(), result: tokens }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body = RefreshTokenRequest,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Refresh token revoked", body = MessageResponse),
        (status = 401, description = "Missing/invalid access token or refresh token")
    )
)]
pub async fn logout_handler(
    State(state): State<AppState>,
    _claims: AccessClaims,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_refresh_token(&payload, &state.codec, state.refresh_tokens.as_ref())
        .await?;

    state.auth_service.logout(&payload.refresh_token).await?;

    Ok(Json(MessageResponse::new(messages::LOGOUT_SUCCESS)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair issued", body = AuthResponse),
        (status = 401, description = "Refresh token invalid, expired, or already used")
    )
)]
pub async fn refresh_token_handler(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validation::validate_refresh_token(&payload, &state.codec, state.refresh_tokens.as_ref())
        .await?;

    let tokens = state.auth_service.refresh_token(&payload.refresh_token).await?;

    Ok(Json(AuthResponse {
        message: messages::REFRESH_TOKEN_SUCCESS.to_string(),
        result: tokens,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified (or already verified)", body = MessageResponse),
        (status = 401, description = "Token invalid or expired")
    )
)]
pub async fn verify_email_handler(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_verify_email(&payload, &state.codec).await?;

    let outcome = state.auth_service.verify_email(&payload.email_verify_token).await?;

    let message = match outcome {
        EmailVerification::Verified => messages::EMAIL_VERIFY_SUCCESS,
        EmailVerification::AlreadyVerified => messages::EMAIL_ALREADY_VERIFIED_BEFORE,
    };
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-verify-email",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Verification token re-issued", body = MessageResponse),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn resend_verify_email_handler(
    State(state): State<AppState>,
    claims: AccessClaims,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = state.auth_service.resend_verify_email(&claims.user_id()).await?;

    let message = match outcome {
        EmailVerification::Verified => messages::RESEND_VERIFY_EMAIL_SUCCESS,
        EmailVerification::AlreadyVerified => messages::EMAIL_ALREADY_VERIFIED_BEFORE,
    };
    Ok(Json(MessageResponse::new(message)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued", body = MessageResponse),
        (status = 404, description = "No account with that email")
    )
)]
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_forgot_password(&payload).await?;

    // The token is handed to the mail pipeline, never to the response body.
    let _token = state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(MessageResponse::new(messages::CHECK_EMAIL_TO_RESET_PASSWORD)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-forgot-password",
    request_body = VerifyForgotPasswordRequest,
    responses(
        (status = 200, description = "Token is valid for a reset", body = MessageResponse),
        (status = 401, description = "Token invalid, expired, or superseded")
    )
)]
pub async fn verify_forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<VerifyForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_verify_forgot_password(&payload, &state.codec).await?;

    state.auth_service.verify_forgot_password(&payload.forgot_password_token).await?;

    Ok(Json(MessageResponse::new(messages::VERIFY_FORGOT_PASSWORD_SUCCESS)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 401, description = "Token invalid, expired, or superseded"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_reset_password(&payload, &state.codec).await?;

    state
        .auth_service
        .reset_password(&payload.forgot_password_token, &payload.password)
        .await?;

    Ok(Json(MessageResponse::new(messages::RESET_PASSWORD_SUCCESS)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn me_handler(
    State(state): State<AppState>,
    claims: AccessClaims,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.get_user(&claims.user_id()).await?;
    Ok(Json(UserResponse::from(user)))
}
