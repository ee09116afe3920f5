use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Account lifecycle settings (verification and password reset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Lifetime of a password reset token in seconds
    pub reset_token_ttl_secs: i64,
    /// Minimum gap between two verification emails for the same address
    pub verification_resend_cooldown_secs: i64,
    /// Minimum accepted password length on reset
    pub min_password_length: usize,
    /// Minimum accepted phone length
    pub min_phone_length: usize,
}

impl AccountConfig {
    /// Expected environment variables (all optional):
    /// - RESET_TOKEN_TTL_SECS (defaults to 3600)
    /// - VERIFICATION_RESEND_COOLDOWN_SECS (defaults to 120)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading account configuration from environment variables");

        let reset_token_ttl_secs = env::var("RESET_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| {
                warn!("RESET_TOKEN_TTL_SECS not set, using default: 3600 seconds");
                "3600".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid RESET_TOKEN_TTL_SECS value: {}", e);
                ConfigError::InvalidValue(format!("RESET_TOKEN_TTL_SECS: {}", e))
            })?;
        debug!("Reset token TTL: {} seconds", reset_token_ttl_secs);

        let verification_resend_cooldown_secs = env::var("VERIFICATION_RESEND_COOLDOWN_SECS")
            .unwrap_or_else(|_| {
                warn!("VERIFICATION_RESEND_COOLDOWN_SECS not set, using default: 120 seconds");
                "120".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid VERIFICATION_RESEND_COOLDOWN_SECS value: {}", e);
                ConfigError::InvalidValue(format!("VERIFICATION_RESEND_COOLDOWN_SECS: {}", e))
            })?;
        debug!("Verification resend cooldown: {} seconds", verification_resend_cooldown_secs);

        let config = AccountConfig {
            reset_token_ttl_secs,
            verification_resend_cooldown_secs,
            ..AccountConfig::default()
        };
        config.validate()?;
        info!("Account configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reset_token_ttl_secs <= 0 {
            error!("Reset token TTL must be positive");
            return Err(ConfigError::ValidationError("Reset token TTL must be greater than 0".to_string()));
        }
        if self.verification_resend_cooldown_secs < 0 {
            error!("Verification cooldown is negative");
            return Err(ConfigError::ValidationError("Verification cooldown cannot be negative".to_string()));
        }
        Ok(())
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        AccountConfig {
            reset_token_ttl_secs: 3600,
            verification_resend_cooldown_secs: 120,
            min_password_length: 6,
            min_phone_length: 10,
        }
    }
}
