pub mod repository_error;
pub mod mongo;
pub mod user_repo;
pub mod order_repo;
pub mod catalog_repo;
pub mod legacy_catalog;
pub mod apartment_repo;
pub mod worker_repo;
pub mod visitor_repo;
