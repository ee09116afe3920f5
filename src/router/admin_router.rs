use axum::{Router, routing::get, middleware};
use crate::handler::admin_handler::{
    dashboard_stats_handler,
    list_users_handler,
    user_details_handler,
    update_user_handler,
    delete_user_handler,
};
use std::sync::Arc;
use crate::service::admin_service::AdminServiceImpl;
use crate::middlewares::auth_middleware::{admin_auth, AuthState};

pub fn admin_router(service: Arc<AdminServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/api/admin/dashboard/stats", get(dashboard_stats_handler))
        .route("/api/admin/users", get(list_users_handler))
        .route(
            "/api/admin/users/{id}",
            get(user_details_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
