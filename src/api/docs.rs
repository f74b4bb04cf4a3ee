//! OpenAPI document for the authentication API.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::models::{
    ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, TokenPair, VerifyEmailRequest, VerifyForgotPasswordRequest,
};
use crate::auth::user::UserResponse;

use super::handlers::{AuthResponse, HealthResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gatehouse API",
        description = "Authentication service for the storefront backend"
    ),
    paths(
        crate::api::handlers::health_handler,
        crate::api::handlers::register_handler,
        crate::api::handlers::login_handler,
        crate::api::handlers::logout_handler,
        crate::api::handlers::refresh_token_handler,
        crate::api::handlers::verify_email_handler,
        crate::api::handlers::resend_verify_email_handler,
        crate::api::handlers::forgot_password_handler,
        crate::api::handlers::verify_forgot_password_handler,
        crate::api::handlers::reset_password_handler,
        crate::api::handlers::me_handler,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        RefreshTokenRequest,
        VerifyEmailRequest,
        ForgotPasswordRequest,
        VerifyForgotPasswordRequest,
        ResetPasswordRequest,
        TokenPair,
        AuthResponse,
        MessageResponse,
        HealthResponse,
        UserResponse,
    )),
    modifiers(&BearerTokenAddon)
)]
pub struct ApiDoc;

/// Registers the bearer security scheme referenced by protected paths.
pub struct BearerTokenAddon;

impl Modify for BearerTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}
