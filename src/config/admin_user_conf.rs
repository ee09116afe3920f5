use std::env;
use serde::{Serialize, Deserialize};
use crate::config::ConfigError;

/// Bootstrap administrator created on startup when missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AdminUserConfig {
            full_name: env::var("ADMIN_FULL_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            email: env::var("ADMIN_EMAIL").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_EMAIL".to_string()))?,
            phone: env::var("ADMIN_PHONE").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PHONE".to_string()))?,
            password: env::var("ADMIN_PASSWORD").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?,
        })
    }
}
