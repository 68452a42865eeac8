use crate::config::PaymentConfig;
use crate::domain::model::{CheckoutOrder, OrderNotes, OrderRequest};
use crate::domain::ports::PaymentGateway;
use crate::utils::error::Result;
use std::sync::Arc;

/// Creates premium-upgrade orders. Amount, currency and product come from
/// configuration, never from the client.
///
/// The completed payment is not verified here; a real integration must
/// check the gateway signature before granting premium access.
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    config: PaymentConfig,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: PaymentConfig) -> Self {
        Self { gateway, config }
    }

    pub fn build_order(&self, user_id: Option<&str>) -> OrderRequest {
        OrderRequest {
            amount: self.config.amount_minor_units,
            currency: self.config.currency.clone(),
            receipt: format!("receipt_order_{}", chrono::Utc::now().timestamp_millis()),
            payment_capture: 1,
            notes: OrderNotes {
                product: self.config.product.clone(),
                user_id: user_id
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_string),
            },
        }
    }

    pub async fn create_checkout(&self, user_id: Option<&str>) -> Result<CheckoutOrder> {
        let order = self.build_order(user_id);
        tracing::info!(
            "💳 Creating payment order {} for {} {}",
            order.receipt,
            order.amount,
            order.currency
        );

        let created = self.gateway.create_order(&order).await?;
        tracing::info!("💳 Payment order created: {}", created.id);
        Ok(created)
    }
}
