use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    /// Username for authentication (optional)
    pub username: Option<String>,
    /// Password for authentication (optional)
    pub password: Option<String>,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGODB_URI: MongoDB connection URI (required)
    /// - MONGODB_DATABASE: Database name (defaults to "woostaa")
    /// - MONGODB_POOL_SIZE: Connection pool size (defaults to 10)
    /// - MONGODB_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env::var("MONGODB_URI")
            .map_err(|_| {
                error!("MONGODB_URI environment variable not found");
                ConfigError::EnvVarNotFound("MONGODB_URI".to_string())
            })?;
        debug!("MongoDB URI loaded (length: {} chars)", uri.len());

        let database = env::var("MONGODB_DATABASE").unwrap_or_else(|_| {
            warn!("MONGODB_DATABASE not set, using default: woostaa");
            "woostaa".to_string()
        });
        debug!("MongoDB database: {}", database);

        let username = env::var("MONGODB_USERNAME").ok();
        let password = env::var("MONGODB_PASSWORD").ok();
        if username.is_some() {
            debug!("MongoDB credentials provided");
        }

        let pool_size = env::var("MONGODB_POOL_SIZE")
            .unwrap_or_else(|_| {
                warn!("MONGODB_POOL_SIZE not set, using default: 10");
                "10".to_string()
            })
            .parse::<u32>()
            .map_err(|_| {
                error!("Invalid MONGODB_POOL_SIZE value");
                ConfigError::InvalidValue("Invalid MONGODB_POOL_SIZE value".to_string())
            })?;

        let connection_timeout_secs = env::var("MONGODB_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| {
                warn!("MONGODB_CONNECTION_TIMEOUT not set, using default: 5 seconds");
                "5".to_string()
            })
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid MONGODB_CONNECTION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid MONGODB_CONNECTION_TIMEOUT value".to_string())
            })?;
        debug!("MongoDB pool size: {}, timeout: {}s", pool_size, connection_timeout_secs);

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Create MongoConfig for testing
    pub fn from_test_env() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "woostaa_test".to_string(),
            username: None,
            password: None,
            pool_size: 2,
            connection_timeout_secs: 2,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }

        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }

        if self.pool_size == 0 {
            error!("MongoDB pool size is 0");
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }

        if self.connection_timeout_secs == 0 {
            error!("MongoDB connection timeout is 0");
            return Err(ConfigError::ValidationError("MongoDB connection timeout must be greater than 0".to_string()));
        }

        match (&self.username, &self.password) {
            (Some(user), _) if user.is_empty() => {
                return Err(ConfigError::ValidationError("MongoDB username cannot be empty if set".to_string()));
            }
            (_, Some(pass)) if pass.is_empty() => {
                return Err(ConfigError::ValidationError("MongoDB password cannot be empty if set".to_string()));
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "woostaa".to_string(),
            username: None,
            password: None,
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
