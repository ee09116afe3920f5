use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::catalog_dto::{CatalogEntryRequest, PricingLineInput, PricingLineResponse, PricingResponse};
use crate::dto::user_dto::MessageResponse;
use crate::handler::parse_id;
use crate::service::catalog_service::{CatalogService, CatalogServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_services_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_active().await?;
    Ok(Json(res))
}

pub async fn get_service_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.get_active(parse_id(&id, "Service")?).await?;
    Ok(Json(res))
}

pub async fn detailed_service_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.detailed(&kind).await?;
    Ok(Json(res))
}

// admin catalog

pub async fn admin_list_catalog_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_all().await?;
    Ok(Json(res))
}

pub async fn admin_create_catalog_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Json(payload): Json<CatalogEntryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn admin_update_catalog_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<CatalogEntryRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let res = service.update(parse_id(&id, "Service")?, payload).await?;
    Ok(Json(res))
}

pub async fn admin_delete_catalog_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.deactivate(parse_id(&id, "Service")?).await?;
    Ok(Json(MessageResponse::new("Service deactivated successfully")))
}

// admin pricing matrix

pub async fn admin_detailed_catalog_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.detailed_all().await?;
    Ok(Json(res))
}

pub async fn admin_service_by_kind_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.detailed(&kind).await?;
    Ok(Json(res))
}

pub async fn admin_pricing_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.pricing(&kind).await?;
    Ok(Json(res))
}

pub async fn admin_add_pricing_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path(kind): Path<String>,
    Json(payload): Json<PricingLineInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let pricing = service.add_pricing(&kind, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(PricingResponse { message: "Pricing rule added successfully".to_string(), pricing }),
    ))
}

pub async fn admin_update_pricing_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path((kind, line_id)): Path<(String, String)>,
    Json(payload): Json<PricingLineInput>,
) -> Result<impl IntoResponse, HandlerError> {
    let line_id = parse_id(&line_id, "Pricing rule")?;
    let rule = service.update_pricing(&kind, line_id, payload).await?;
    Ok(Json(PricingLineResponse { message: "Pricing rule updated successfully".to_string(), rule }))
}

pub async fn admin_delete_pricing_handler(
    State(service): State<Arc<CatalogServiceImpl>>,
    Path((kind, line_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let line_id = parse_id(&line_id, "Pricing rule")?;
    let pricing = service.delete_pricing(&kind, line_id).await?;
    Ok(Json(PricingResponse { message: "Pricing rule deleted successfully".to_string(), pricing }))
}
