use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::order_dto::{
    AdminOrderQuery, CreateOrderRequest, OrderMessage, UpdateOrderStatusRequest, VerifyPaymentRequest,
};
use crate::dto::pagination::PageQuery;
use crate::handler::{caller_id, parse_id};
use crate::service::order_service::{OrderService, OrderServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn create_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let user_id = caller_id(&claims)?;
    let res = service.create_order(user_id, payload).await?;
    info!("Order {} created by {}", res.order.order_number, claims.email);
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn my_orders_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.my_orders(caller_id(&claims)?, query).await?;
    Ok(Json(res))
}

pub async fn get_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let order_id = parse_id(&id, "Order")?;
    let res = service.get_order(caller_id(&claims)?, order_id).await?;
    Ok(Json(res))
}

pub async fn cancel_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let order_id = parse_id(&id, "Order")?;
    let order = service.cancel_order(caller_id(&claims)?, order_id).await?;
    Ok(Json(OrderMessage { message: "Order cancelled successfully".to_string(), order: Some(order) }))
}

pub async fn verify_payment_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(HandlerError::validation)?;
    let order = service.verify_payment(caller_id(&claims)?, payload).await?;
    Ok(Json(OrderMessage { message: "Payment verified successfully".to_string(), order: Some(order) }))
}

pub async fn admin_list_orders_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Query(query): Query<AdminOrderQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list_all(query).await?;
    Ok(Json(res))
}

pub async fn admin_order_details_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.order_details(parse_id(&id, "Order")?).await?;
    Ok(Json(res))
}

pub async fn admin_update_status_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let order_id = parse_id(&id, "Order")?;
    let status = payload.status;
    let order = service.update_status(order_id, payload).await?;
    info!("Order {} moved to {:?} by {}", order_id, status, claims.email);
    Ok(Json(OrderMessage { message: "Order status updated successfully".to_string(), order: Some(order) }))
}
