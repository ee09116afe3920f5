use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Razorpay gateway credentials. Absent credentials disable online payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    /// ISO currency code sent with every gateway order
    pub currency: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl PaymentConfig {
    /// Expected environment variables:
    /// - RAZORPAY_KEY_ID, RAZORPAY_KEY_SECRET (required together)
    /// - RAZORPAY_CURRENCY (defaults to INR)
    /// - RAZORPAY_API_BASE (defaults to https://api.razorpay.com/v1)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading payment gateway configuration from environment variables");

        let key_id = env::var("RAZORPAY_KEY_ID")
            .map_err(|_| ConfigError::EnvVarNotFound("RAZORPAY_KEY_ID".to_string()))?;
        let key_secret = env::var("RAZORPAY_KEY_SECRET")
            .map_err(|_| ConfigError::EnvVarNotFound("RAZORPAY_KEY_SECRET".to_string()))?;
        debug!("Razorpay key id: {}", key_id);

        let currency = env::var("RAZORPAY_CURRENCY").unwrap_or_else(|_| {
            warn!("RAZORPAY_CURRENCY not set, defaulting to INR");
            "INR".to_string()
        });
        let api_base_url = env::var("RAZORPAY_API_BASE")
            .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string());
        let timeout_secs = env::var("RAZORPAY_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let config = PaymentConfig {
            key_id,
            key_secret,
            currency,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        };
        config.validate()?;
        info!("Payment gateway configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        PaymentConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: "rzp_test_secret".to_string(),
            currency: "INR".to_string(),
            api_base_url: "http://localhost:9999/v1".to_string(),
            timeout_secs: 2,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_id.trim().is_empty() || self.key_secret.trim().is_empty() {
            error!("Razorpay key id or secret is empty");
            return Err(ConfigError::ValidationError("Razorpay credentials cannot be empty".to_string()));
        }
        if self.currency.len() != 3 {
            error!("Invalid currency code: {}", self.currency);
            return Err(ConfigError::ValidationError(format!("Invalid currency code: {}", self.currency)));
        }
        Ok(())
    }
}
