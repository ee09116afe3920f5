pub mod jwt;
pub mod password;
pub mod email;
pub mod notification;
pub mod payment;
pub mod logger;
pub mod error;
