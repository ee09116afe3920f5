pub mod pricing;
pub mod user_service;
pub mod order_service;
pub mod catalog_service;
pub mod directory_service;
pub mod admin_service;
pub mod visitor_service;
