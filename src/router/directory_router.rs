use axum::{Router, routing::get, middleware};
use crate::handler::directory_handler::{
    available_apartments_handler,
    get_apartment_handler,
    areas_handler,
    pincodes_handler,
    admin_list_apartments_handler,
    admin_create_apartment_handler,
    admin_update_apartment_handler,
    admin_delete_apartment_handler,
    admin_list_workers_handler,
    admin_get_worker_handler,
    admin_create_worker_handler,
    admin_update_worker_handler,
    admin_delete_worker_handler,
};
use std::sync::Arc;
use crate::service::directory_service::DirectoryServiceImpl;
use crate::middlewares::auth_middleware::{admin_auth, AuthState};

pub fn directory_router(service: Arc<DirectoryServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public apartment lookups
    let public = Router::new()
        .route("/api/apartments/available", get(available_apartments_handler))
        .route("/api/apartments/areas/list", get(areas_handler))
        .route("/api/apartments/pincodes/{area}", get(pincodes_handler))
        .route("/api/apartments/{id}", get(get_apartment_handler));

    // Admin-protected apartment and worker management
    let admin = Router::new()
        .route(
            "/api/admin/apartments",
            get(admin_list_apartments_handler).post(admin_create_apartment_handler),
        )
        .route(
            "/api/admin/apartments/{id}",
            get(get_apartment_handler)
                .put(admin_update_apartment_handler)
                .delete(admin_delete_apartment_handler),
        )
        .route(
            "/api/admin/workers",
            get(admin_list_workers_handler).post(admin_create_worker_handler),
        )
        .route(
            "/api/admin/workers/{id}",
            get(admin_get_worker_handler)
                .put(admin_update_worker_handler)
                .delete(admin_delete_worker_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public
        .merge(admin)
        .with_state(service)
}
