use crate::core::generation::RetryPolicy;
use crate::domain::model::GenerationParameters;
use crate::utils::error::{LmsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File configuration. Every section and field has a default, so an empty
/// file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub video_search: VideoSearchConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub database_url: String,
    pub max_connections: u32,
    pub course_list_limit: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            database_url: "sqlite://ai-lms.db?mode=rwc".to_string(),
            max_connections: 5,
            course_list_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub models: Vec<String>,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let parameters = GenerationParameters::default();
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            models: vec!["gemini-1.5-flash".to_string()],
            max_attempts: 3,
            base_delay_ms: 1000,
            timeout_seconds: 60,
            temperature: parameters.temperature,
            top_p: parameters.top_p,
            top_k: parameters.top_k,
            max_output_tokens: parameters.max_output_tokens,
            response_mime_type: parameters.response_mime_type,
        }
    }
}

impl GenerationConfig {
    pub fn parameters(&self) -> GenerationParameters {
        GenerationParameters {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
            response_mime_type: self.response_mime_type.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    pub fn api_key(&self) -> Option<&str> {
        credential(&self.api_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub enabled: bool,
}

impl Default for VideoSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com".to_string(),
            api_key: None,
            timeout_seconds: 10,
            enabled: true,
        }
    }
}

impl VideoSearchConfig {
    pub fn api_key(&self) -> Option<&str> {
        credential(&self.api_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub endpoint: String,
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub amount_minor_units: u64,
    pub currency: String,
    pub product: String,
    pub timeout_seconds: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.razorpay.com".to_string(),
            key_id: None,
            key_secret: None,
            amount_minor_units: 100 * 100,
            currency: "USD".to_string(),
            product: "AI-LMS Premium".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl PaymentConfig {
    pub fn key_id(&self) -> Option<&str> {
        credential(&self.key_id)
    }

    pub fn key_secret(&self) -> Option<&str> {
        credential(&self.key_secret)
    }
}

/// 空字串或未替換的 ${VAR} 都視為未設定
fn credential(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with("${"))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LmsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LmsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LmsError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Credentials that are absent. They are not startup errors; the call
    /// path that needs one fails with a configuration error instead.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.generation.api_key().is_none() {
            missing.push("GEMINI_API_KEY");
        }
        if self.video_search.enabled && self.video_search.api_key().is_none() {
            missing.push("YOUTUBE_API_KEY");
        }
        if self.payment.key_id().is_none() {
            missing.push("RAZORPAY_KEY_ID");
        }
        if self.payment.key_secret().is_none() {
            missing.push("RAZORPAY_KEY_SECRET");
        }
        missing
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_not_blank("server.bind", &self.server.bind)?;
        validation::validate_not_blank("server.database_url", &self.server.database_url)?;
        validation::validate_range("server.max_connections", self.server.max_connections, 1, 64)?;
        validation::validate_range(
            "server.course_list_limit",
            self.server.course_list_limit,
            1,
            100,
        )?;

        validation::validate_endpoint("generation.endpoint", &self.generation.endpoint)?;
        if self.generation.models.is_empty() {
            return Err(LmsError::InvalidConfigValueError {
                field: "generation.models".to_string(),
                value: "[]".to_string(),
                reason: "At least one candidate model is required".to_string(),
            });
        }
        for model in &self.generation.models {
            validation::validate_not_blank("generation.models", model)?;
        }
        validation::validate_range("generation.max_attempts", self.generation.max_attempts, 1, 10)?;
        validation::validate_at_least(
            "generation.timeout_seconds",
            self.generation.timeout_seconds,
            1,
        )?;

        validation::validate_endpoint("video_search.endpoint", &self.video_search.endpoint)?;

        validation::validate_endpoint("payment.endpoint", &self.payment.endpoint)?;
        validation::validate_at_least(
            "payment.amount_minor_units",
            self.payment.amount_minor_units,
            1,
        )?;
        validation::validate_currency_code("payment.currency", &self.payment.currency)?;

        Ok(())
    }
}
