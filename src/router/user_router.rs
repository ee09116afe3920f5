use axum::{Router, routing::{get, post}, middleware};
use crate::handler::user_handler::{
    register_handler,
    verify_email_handler,
    login_handler,
    refresh_token_handler,
    get_profile_handler,
    update_profile_handler,
    resend_verification_handler,
    forgot_password_handler,
    reset_password_handler,
    validate_reset_token_handler,
};
use std::sync::Arc;
use crate::service::user_service::UserServiceImpl;
use crate::middlewares::auth_middleware::{user_auth, AuthState};

pub fn user_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public account routes
    let public = Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/verify-email", get(verify_email_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/refresh-token", post(refresh_token_handler))
        .route("/api/auth/resend-verification", post(resend_verification_handler))
        .route("/api/auth/forgot-password", post(forgot_password_handler))
        .route("/api/auth/reset-password", post(reset_password_handler))
        .route("/api/auth/validate-reset-token", get(validate_reset_token_handler));

    // Signed-in user routes
    let protected = Router::new()
        .route("/api/auth/profile", get(get_profile_handler).put(update_profile_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, user_auth));

    public
        .merge(protected)
        .with_state(service)
}
