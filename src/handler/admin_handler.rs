use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::dto::admin_dto::AdminUserUpdate;
use crate::dto::pagination::PageQuery;
use crate::dto::user_dto::{MessageResponse, ProfileResponse};
use crate::handler::parse_id;
use crate::service::admin_service::{AdminService, AdminServiceImpl};
use crate::util::error::HandlerError;

pub async fn dashboard_stats_handler(
    State(service): State<Arc<AdminServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.dashboard().await?;
    Ok(Json(res))
}

pub async fn list_users_handler(
    State(service): State<Arc<AdminServiceImpl>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_users(query).await?;
    Ok(Json(res))
}

pub async fn user_details_handler(
    State(service): State<Arc<AdminServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.user_details(parse_id(&id, "User")?).await?;
    Ok(Json(res))
}

pub async fn update_user_handler(
    State(service): State<Arc<AdminServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = service.update_user(parse_id(&id, "User")?, payload).await?;
    Ok(Json(ProfileResponse { message: "User updated successfully".to_string(), user }))
}

pub async fn delete_user_handler(
    State(service): State<Arc<AdminServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = parse_id(&id, "User")?;
    service.delete_user(user_id).await?;
    info!("User {} deleted", user_id);
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
