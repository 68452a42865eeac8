use crate::adapters::{transport_error, GOOGLE_API_KEY_HEADER};
use crate::config::VideoSearchConfig;
use crate::domain::ports::VideoSearch;
use crate::utils::error::{LmsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Video search over the YouTube Data API v3 `search` endpoint.
pub struct YouTubeClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

impl YouTubeClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &VideoSearchConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key().map(str::to_string),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl VideoSearch for YouTubeClient {
    async fn first_video_id(&self, query: &str) -> Result<Option<String>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| LmsError::MissingConfigError {
            field: "YOUTUBE_API_KEY".to_string(),
        })?;

        let response = self
            .client
            .get(format!("{}/youtube/v3/search", self.endpoint))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", "1"),
            ])
            .header(GOOGLE_API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LmsError::BackendStatusError {
                backend: "youtube".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(transport_error)?;
        Ok(parsed.items.into_iter().find_map(|item| item.id.video_id))
    }
}
