use axum::{Router, routing::{get, post, put}, middleware};
use crate::handler::catalog_handler::{
    list_services_handler,
    get_service_handler,
    detailed_service_handler,
    admin_list_catalog_handler,
    admin_create_catalog_handler,
    admin_update_catalog_handler,
    admin_delete_catalog_handler,
    admin_detailed_catalog_handler,
    admin_service_by_kind_handler,
    admin_pricing_handler,
    admin_add_pricing_handler,
    admin_update_pricing_handler,
    admin_delete_pricing_handler,
};
use std::sync::Arc;
use crate::service::catalog_service::CatalogServiceImpl;
use crate::middlewares::auth_middleware::{admin_auth, AuthState};

pub fn catalog_router(service: Arc<CatalogServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public catalog
    let public = Router::new()
        .route("/api/services", get(list_services_handler))
        .route("/api/services/detailed/{kind}", get(detailed_service_handler))
        .route("/api/services/{id}", get(get_service_handler));

    // Admin catalog and pricing matrix
    let admin = Router::new()
        .route("/api/admin/catalog", get(admin_list_catalog_handler).post(admin_create_catalog_handler))
        .route(
            "/api/admin/catalog/{id}",
            put(admin_update_catalog_handler).delete(admin_delete_catalog_handler),
        )
        .route("/api/admin/services/detailed", get(admin_detailed_catalog_handler))
        .route("/api/admin/services/{kind}", get(admin_service_by_kind_handler))
        .route("/api/admin/services/{kind}/pricing", get(admin_pricing_handler))
        .route("/api/admin/services/{kind}/pricing/add", post(admin_add_pricing_handler))
        .route(
            "/api/admin/services/{kind}/pricing/{line_id}",
            put(admin_update_pricing_handler).delete(admin_delete_pricing_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth));

    public
        .merge(admin)
        .with_state(service)
}
