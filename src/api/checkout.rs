use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub user_id: Option<String>,
    // 只記錄；金額一律來自設定
    pub plan_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

/// POST /api/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    raw: Bytes,
) -> ApiResult<Json<CheckoutResponse>> {
    let body = parse_checkout_body(&raw)?;
    if let Some(plan) = &body.plan_name {
        tracing::debug!("Checkout requested for plan: {}", plan);
    }

    let order = state.checkout.create_checkout(body.user_id.as_deref()).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
    }))
}

/// 空 body 也可以建立訂單；有內容就必須是合法 JSON
fn parse_checkout_body(raw: &[u8]) -> ApiResult<CheckoutBody> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(CheckoutBody::default());
    }
    let Json(body) = Json::<CheckoutBody>::from_bytes(raw)?;
    Ok(body)
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/api/create-checkout-session", post(create_checkout_session))
}
