pub mod toml_config;

pub use toml_config::{AppConfig, GenerationConfig, PaymentConfig, ServerConfig, VideoSearchConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ai-lms")]
#[command(about = "AI course outline generation service")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "LMS_CONFIG")]
    pub config: Option<String>,

    /// Address the HTTP server listens on
    #[arg(long, env = "LMS_BIND")]
    pub bind: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    #[arg(long, env = "RAZORPAY_KEY_ID", hide_env_values = true)]
    pub razorpay_key_id: Option<String>,

    #[arg(long, env = "RAZORPAY_KEY_SECRET", hide_env_values = true)]
    pub razorpay_key_secret: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 讀取配置檔（若有），再套用命令列與環境變數覆蓋
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(url) = &self.database_url {
            config.server.database_url = url.clone();
        }
        if let Some(key) = &self.gemini_api_key {
            config.generation.api_key = Some(key.clone());
        }
        if let Some(key) = &self.youtube_api_key {
            config.video_search.api_key = Some(key.clone());
        }
        if let Some(key_id) = &self.razorpay_key_id {
            config.payment.key_id = Some(key_id.clone());
        }
        if let Some(secret) = &self.razorpay_key_secret {
            config.payment.key_secret = Some(secret.clone());
        }
    }
}
