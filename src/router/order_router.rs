use axum::{Router, routing::{get, post, put}, middleware};
use crate::handler::order_handler::{
    create_order_handler,
    my_orders_handler,
    get_order_handler,
    cancel_order_handler,
    verify_payment_handler,
    admin_list_orders_handler,
    admin_order_details_handler,
    admin_update_status_handler,
};
use std::sync::Arc;
use crate::service::order_service::OrderServiceImpl;
use crate::middlewares::auth_middleware::{admin_auth, user_auth, AuthState};

pub fn order_router(service: Arc<OrderServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Customer routes
    let customer = Router::new()
        .route("/api/orders/create", post(create_order_handler))
        .route("/api/orders/my-orders", get(my_orders_handler))
        .route("/api/orders/payment/verify", post(verify_payment_handler))
        .route("/api/orders/{id}", get(get_order_handler))
        .route("/api/orders/{id}/cancel", put(cancel_order_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), user_auth));

    // Admin-protected routes
    let admin = Router::new()
        .route("/api/orders/admin/all", get(admin_list_orders_handler))
        .route("/api/orders/admin/details/{id}", get(admin_order_details_handler))
        .route("/api/orders/admin/{id}/status", put(admin_update_status_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    customer
        .merge(admin)
        .with_state(service)
}
