use crate::adapters::transport_error;
use crate::config::PaymentConfig;
use crate::domain::model::{CheckoutOrder, OrderRequest};
use crate::domain::ports::PaymentGateway;
use crate::utils::error::{LmsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Payment orders over the Razorpay Orders API.
pub struct RazorpayClient {
    client: Client,
    endpoint: String,
    key_id: Option<String>,
    key_secret: Option<String>,
}

impl RazorpayClient {
    pub fn new(
        endpoint: impl Into<String>,
        key_id: Option<String>,
        key_secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        })
    }

    pub fn from_config(config: &PaymentConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.key_id().map(str::to_string),
            config.key_secret().map(str::to_string),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, order: &OrderRequest) -> Result<CheckoutOrder> {
        let (key_id, key_secret) = match (&self.key_id, &self.key_secret) {
            (Some(id), Some(secret)) => (id, secret),
            (None, _) => {
                return Err(LmsError::MissingConfigError {
                    field: "RAZORPAY_KEY_ID".to_string(),
                })
            }
            (_, None) => {
                return Err(LmsError::MissingConfigError {
                    field: "RAZORPAY_KEY_SECRET".to_string(),
                })
            }
        };

        let response = self
            .client
            .post(format!("{}/v1/orders", self.endpoint))
            .basic_auth(key_id, Some(key_secret))
            .json(order)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Payment order creation failed ({}): {}", status, body);

            let message = match status.as_u16() {
                400 => "Invalid request for payment order. Check amount or currency.",
                401 => "Payment gateway authentication failed. Check your API keys.",
                _ => "Failed to create payment order.",
            };
            return Err(LmsError::PaymentError {
                status: Some(status.as_u16()),
                message: message.to_string(),
            });
        }

        let created: CheckoutOrder = response.json().await.map_err(transport_error)?;
        Ok(created)
    }
}
