use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::directory_dto::{ApartmentRequest, AvailableApartmentsQuery, WorkerRequest};
use crate::dto::pagination::PageQuery;
use crate::dto::user_dto::MessageResponse;
use crate::handler::parse_id;
use crate::service::directory_service::{DirectoryService, DirectoryServiceImpl};
use crate::util::error::HandlerError;

pub async fn available_apartments_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Query(query): Query<AvailableApartmentsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.available_apartments(query).await?;
    Ok(Json(res))
}

pub async fn get_apartment_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_apartment(parse_id(&id, "Apartment")?).await?;
    Ok(Json(res))
}

pub async fn areas_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.areas().await?;
    Ok(Json(res))
}

pub async fn pincodes_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(area): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.pincodes(&area).await?;
    Ok(Json(res))
}

pub async fn admin_list_apartments_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_apartments(query).await?;
    Ok(Json(res))
}

pub async fn admin_create_apartment_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Json(payload): Json<ApartmentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.create_apartment(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn admin_update_apartment_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<ApartmentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.update_apartment(parse_id(&id, "Apartment")?, payload).await?;
    Ok(Json(res))
}

pub async fn admin_delete_apartment_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_apartment(parse_id(&id, "Apartment")?).await?;
    Ok(Json(MessageResponse::new("Apartment deleted successfully")))
}

pub async fn admin_list_workers_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_workers(query).await?;
    Ok(Json(res))
}

pub async fn admin_get_worker_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_worker(parse_id(&id, "Worker")?).await?;
    Ok(Json(res))
}

pub async fn admin_create_worker_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Json(payload): Json<WorkerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.create_worker(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn admin_update_worker_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<WorkerRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.update_worker(parse_id(&id, "Worker")?, payload).await?;
    Ok(Json(res))
}

pub async fn admin_delete_worker_handler(
    State(service): State<Arc<DirectoryServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_worker(parse_id(&id, "Worker")?).await?;
    Ok(Json(MessageResponse::new("Worker deleted successfully")))
}
