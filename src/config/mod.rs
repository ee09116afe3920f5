pub mod jwt_conf;
pub mod email_conf;
pub mod mongo_conf;
pub mod admin_user_conf;
pub mod app_conf;
pub mod account_conf;
pub mod payment_conf;


pub use jwt_conf::JwtConfig;
pub use email_conf::EmailConfig;
pub use mongo_conf::MongoConfig;
pub use app_conf::AppConfig;
pub use account_conf::AccountConfig;
pub use payment_conf::PaymentConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
