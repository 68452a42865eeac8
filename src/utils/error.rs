use thiserror::Error;

#[derive(Error, Debug)]
pub enum LmsError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Missing required field: {field}")]
    MissingFieldError { field: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("{backend} returned status {status}: {body}")]
    BackendStatusError {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from backend: {message}")]
    InvalidResponseError { message: String },

    #[error("All {candidates} generation candidate(s) failed after {attempts} attempt(s); last error: {last}")]
    GenerationFailed {
        candidates: usize,
        attempts: u32,
        #[source]
        last: Box<LmsError>,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Payment gateway error: {message}")]
    PaymentError { status: Option<u16>, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LmsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    TransientBackend,
    Persistence,
    Payment,
    NotFound,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LmsError {
    pub fn validation(message: impl Into<String>) -> Self {
        LmsError::ValidationError {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        LmsError::InvalidResponseError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LmsError::ValidationError { .. } | LmsError::MissingFieldError { .. } => {
                ErrorCategory::Validation
            }
            LmsError::ConfigError { .. }
            | LmsError::MissingConfigError { .. }
            | LmsError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LmsError::ApiError(_)
            | LmsError::BackendStatusError { .. }
            | LmsError::InvalidResponseError { .. }
            | LmsError::GenerationFailed { .. } => ErrorCategory::TransientBackend,
            LmsError::DatabaseError(_) | LmsError::Conflict { .. } => ErrorCategory::Persistence,
            LmsError::NotFound { .. } => ErrorCategory::NotFound,
            LmsError::PaymentError { .. } => ErrorCategory::Payment,
            LmsError::SerializationError(_) | LmsError::IoError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::TransientBackend | ErrorCategory::Payment => ErrorSeverity::Medium,
            ErrorCategory::Persistence | ErrorCategory::Internal => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Only a single attempt failure may be retried; an exhausted fallback
    /// loop is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LmsError::ApiError(_)
                | LmsError::BackendStatusError { .. }
                | LmsError::InvalidResponseError { .. }
        )
    }

    /// Upstream signalled overload or an exhausted quota.
    pub fn is_overloaded(&self) -> bool {
        match self {
            LmsError::BackendStatusError { status, body, .. } => {
                *status == 429
                    || *status == 503
                    || body.contains("overloaded")
                    || body.contains("quota")
            }
            LmsError::GenerationFailed { last, .. } => last.is_overloaded(),
            _ => false,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            LmsError::Conflict { .. } => 409,
            LmsError::PaymentError { .. } => 502,
            _ => match self.category() {
                ErrorCategory::Validation => 400,
                ErrorCategory::NotFound => 404,
                ErrorCategory::TransientBackend if self.is_overloaded() => 503,
                _ => 500,
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LmsError::ValidationError { message } => message.clone(),
            LmsError::MissingFieldError { field } => format!("{} is required.", field),
            LmsError::ConfigError { .. }
            | LmsError::MissingConfigError { .. }
            | LmsError::InvalidConfigValueError { .. } => {
                "Server configuration error: service not available. Please contact support."
                    .to_string()
            }
            _ if self.is_overloaded() => {
                "The AI service is currently overloaded or has hit a quota limit. Please try again later."
                    .to_string()
            }
            LmsError::GenerationFailed { last, .. } => match last.as_ref() {
                LmsError::InvalidResponseError { .. } | LmsError::SerializationError(_) => {
                    "The AI generated an invalid response. Please try again or refine your description."
                        .to_string()
                }
                _ => "Could not generate content with any available AI models. Please try again."
                    .to_string(),
            },
            LmsError::ApiError(_)
            | LmsError::BackendStatusError { .. }
            | LmsError::InvalidResponseError { .. } => {
                "An upstream service failed. Please try again later.".to_string()
            }
            LmsError::Conflict { message } => message.clone(),
            LmsError::NotFound { message } => message.clone(),
            LmsError::DatabaseError(_) => {
                "Failed to access course storage. Please try again later.".to_string()
            }
            LmsError::PaymentError { message, .. } => message.clone(),
            LmsError::SerializationError(_) | LmsError::IoError(_) => {
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Check the request body for missing or invalid fields",
            ErrorCategory::Configuration => {
                "Set the missing API key or fix the configuration file, then restart"
            }
            ErrorCategory::TransientBackend => {
                "Upstream backend is failing; retry later or add another candidate model"
            }
            ErrorCategory::Persistence => "Check the database URL and that the file is writable",
            ErrorCategory::Payment => "Check the payment gateway credentials and order amount",
            ErrorCategory::NotFound => "Verify the identifier",
            ErrorCategory::Internal => "Inspect the logs for details",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16, body: &str) -> LmsError {
        LmsError::BackendStatusError {
            backend: "gemini".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_codes_follow_categories() {
        assert_eq!(LmsError::validation("topic is required").status_code(), 400);
        assert_eq!(
            LmsError::MissingConfigError {
                field: "GEMINI_API_KEY".to_string()
            }
            .status_code(),
            500
        );
        assert_eq!(
            LmsError::NotFound {
                message: "nope".to_string()
            }
            .status_code(),
            404
        );
        assert_eq!(
            LmsError::Conflict {
                message: "dup".to_string()
            }
            .status_code(),
            409
        );
    }

    #[test]
    fn test_exhausted_generation_maps_overload_to_503() {
        let overloaded = LmsError::GenerationFailed {
            candidates: 1,
            attempts: 3,
            last: Box::new(upstream(503, "The model is overloaded")),
        };
        assert_eq!(overloaded.status_code(), 503);
        assert!(overloaded.user_friendly_message().contains("overloaded"));

        let invalid = LmsError::GenerationFailed {
            candidates: 1,
            attempts: 3,
            last: Box::new(LmsError::invalid_response("not json")),
        };
        assert_eq!(invalid.status_code(), 500);
        assert!(invalid.user_friendly_message().contains("invalid response"));
    }

    #[test]
    fn test_configuration_message_is_distinct_from_upstream_failure() {
        let config = LmsError::MissingConfigError {
            field: "GEMINI_API_KEY".to_string(),
        };
        let flaky = LmsError::GenerationFailed {
            candidates: 1,
            attempts: 3,
            last: Box::new(upstream(500, "internal")),
        };
        assert_eq!(config.status_code(), flaky.status_code());
        assert_ne!(config.user_friendly_message(), flaky.user_friendly_message());
        assert!(!config.is_retryable());
        assert!(!flaky.is_retryable());
        assert!(upstream(500, "internal").is_retryable());
    }

    #[test]
    fn test_friendly_message_does_not_leak_internal_detail() {
        let err = upstream(500, "stack trace at /srv/app.rs:42");
        assert!(!err.user_friendly_message().contains("/srv/app.rs"));
    }
}
