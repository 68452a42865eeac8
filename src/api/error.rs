use crate::utils::error::{ErrorSeverity, LmsError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for LmsError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 詳細錯誤只寫入日誌，不回傳給使用者
        match self.severity() {
            ErrorSeverity::Low => tracing::info!("Request rejected ({}): {}", status, self),
            ErrorSeverity::Medium => tracing::warn!(
                "⚠️ Request failed ({}): {} (Category: {:?})",
                status,
                self,
                self.category()
            ),
            ErrorSeverity::High | ErrorSeverity::Critical => {
                tracing::error!(
                    "❌ Request failed ({}): {} (Category: {:?})",
                    status,
                    self,
                    self.category()
                );
                tracing::error!("💡 Recovery suggestion: {}", self.recovery_suggestion());
            }
        }

        let body = ErrorBody {
            success: false,
            error: self.user_friendly_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for LmsError {
    fn from(rejection: JsonRejection) -> Self {
        LmsError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, LmsError>;
