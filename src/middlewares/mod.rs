pub mod auth_middleware;
pub mod visitor_middleware;
