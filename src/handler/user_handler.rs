use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::user_dto::{
    EmailRequest, LoginRequest, ProfileResponse, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    TokenQuery, UpdateProfileRequest,
};
use crate::handler::caller_id;
use crate::service::user_service::{Registration, UserService, UserServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = match service.register(payload).await? {
        Registration::Created(body) => (StatusCode::CREATED, Json(body)),
        Registration::Resent(body) => (StatusCode::OK, Json(body)),
    };
    Ok(res)
}

pub async fn verify_email_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| HandlerError::bad_request("Invalid verification token"))?;
    let target = service.verify_email(&token).await?;
    Ok(Redirect::to(&target))
}

pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.login(payload).await?;
    Ok(Json(res))
}

pub async fn refresh_token_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.refresh_token(&payload.refresh_token).await?;
    Ok(Json(res))
}

pub async fn get_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_profile(caller_id(&claims)?).await?;
    Ok(Json(res))
}

pub async fn update_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = service.update_profile(caller_id(&claims)?, payload).await?;
    Ok(Json(ProfileResponse { message: "Profile updated successfully".to_string(), user }))
}

pub async fn resend_verification_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.resend_verification(&payload.email).await?;
    Ok(Json(res))
}

pub async fn forgot_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.forgot_password(&payload.email).await?;
    Ok(Json(res))
}

pub async fn reset_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.reset_password(payload).await?;
    Ok(Json(res))
}

pub async fn validate_reset_token_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let token = query.token.unwrap_or_default();
    let res = service.validate_reset_token(&token).await?;
    Ok(Json(res))
}
