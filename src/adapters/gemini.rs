use crate::adapters::{transport_error, GOOGLE_API_KEY_HEADER};
use crate::config::GenerationConfig;
use crate::domain::model::GenerationParameters;
use crate::domain::ports::TextGenerator;
use crate::utils::error::{LmsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text generation over the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfigBody<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key().map(str::to_string),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| LmsError::MissingConfigError {
            field: "GEMINI_API_KEY".to_string(),
        })?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfigBody {
                temperature: parameters.temperature,
                top_p: parameters.top_p,
                top_k: parameters.top_k,
                max_output_tokens: parameters.max_output_tokens,
                response_mime_type: &parameters.response_mime_type,
            },
        };

        tracing::debug!("Making generation request for model: {}", model);
        let response = self
            .client
            .post(self.model_url(model))
            .header(GOOGLE_API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::debug!("Generation response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LmsError::BackendStatusError {
                backend: format!("gemini/{}", model),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LmsError::invalid_response(format!("Unexpected generation payload: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LmsError::invalid_response(
                "Invalid response structure from generative model.",
            ));
        }

        Ok(text)
    }
}
