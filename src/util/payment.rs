use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{error, info, instrument};

use crate::config::PaymentConfig;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Gateway request failed: {0}")]
    Request(String),
    #[error("Gateway rejected the order ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Unexpected gateway response: {0}")]
    Response(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a gateway order and returns its id. `amount_minor` is in the
    /// smallest currency unit.
    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<String, PaymentError>;

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool;

    fn currency(&self) -> &str;
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Deserialize)]
struct CreateOrderReply {
    id: String,
}

pub struct RazorpayGateway {
    config: PaymentConfig,
    http_client: Client,
}

impl RazorpayGateway {
    pub fn new(config: PaymentConfig) -> Result<Self, PaymentError> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Request(e.to_string()))?;
        info!("Razorpay gateway initialized");
        Ok(Self { config, http_client })
    }
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, the checkout signature format.
pub fn checkout_signature(secret: &str, gateway_order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}|{}", gateway_order_id, payment_id).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self))]
    async fn create_order(&self, amount_minor: i64, currency: &str, receipt: &str) -> Result<String, PaymentError> {
        let url = format!("{}/orders", self.config.api_base_url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateOrderBody { amount: amount_minor, currency, receipt })
            .send()
            .await
            .map_err(|e| {
                error!("Razorpay request failed: {}", e);
                PaymentError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected { status: status.as_u16(), body });
        }

        let reply: CreateOrderReply = response
            .json()
            .await
            .map_err(|e| PaymentError::Response(e.to_string()))?;
        info!(gateway_order_id = %reply.id, "Razorpay order created");
        Ok(reply.id)
    }

    fn verify_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(self.config.key_secret.as_bytes()) else {
            return false;
        };
        mac.update(format!("{}|{}", gateway_order_id, payment_id).as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn currency(&self) -> &str {
        &self.config.currency
    }
}
