pub mod user_router;
pub mod order_router;
pub mod catalog_router;
pub mod directory_router;
pub mod admin_router;
