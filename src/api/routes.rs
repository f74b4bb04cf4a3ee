//! Router assembly for the authentication API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::docs::ApiDoc;
use super::handlers::{
    forgot_password_handler, health_handler, login_handler, logout_handler, me_handler,
    refresh_token_handler, register_handler, resend_verify_email_handler, reset_password_handler,
    verify_email_handler, verify_forgot_password_handler,
};
use super::state::AppState;
use crate::config::ServerConfig;

/// Build the service router. Protected routes authenticate through the
/// `AccessClaims` extractor in their handler signatures; everything else is
/// public by design.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/auth/register", post(register_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .route("/api/v1/auth/refresh-token", post(refresh_token_handler))
        .route("/api/v1/auth/verify-email", post(verify_email_handler))
        .route("/api/v1/auth/resend-verify-email", post(resend_verify_email_handler))
        .route("/api/v1/auth/forgot-password", post(forgot_password_handler))
        .route("/api/v1/auth/verify-forgot-password", post(verify_forgot_password_handler))
        .route("/api/v1/auth/reset-password", post(reset_password_handler))
        .route("/api/v1/users/me", get(me_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let router = if config.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
