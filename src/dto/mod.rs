pub mod pagination;
pub mod order_dto;
pub mod user_dto;
pub mod catalog_dto;
pub mod directory_dto;
pub mod admin_dto;
