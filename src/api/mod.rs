//! HTTP surface.

pub mod checkout;
pub mod courses;
pub mod error;
pub mod health;

pub use error::ApiResult;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::adapters::{GeminiClient, RazorpayClient, SqliteCourseStore, YouTubeClient};
use crate::config::AppConfig;
use crate::core::checkout::CheckoutService;
use crate::core::courses::CourseService;
use crate::core::enrichment::Enricher;
use crate::core::generation::GenerationClient;
use crate::core::pipeline::CoursePipeline;
use crate::domain::ports::{CourseStore, PaymentGateway, TextGenerator, VideoSearch};
use crate::utils::error::Result;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<CourseService>,
    pub checkout: Arc<CheckoutService>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(courses: CourseService, checkout: CheckoutService) -> Self {
        Self {
            courses: Arc::new(courses),
            checkout: Arc::new(checkout),
            startup_time: Utc::now(),
        }
    }

    /// Wires every backend from configuration. Credentials are handed to
    /// each adapter here; nothing reads the environment later.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = SqliteCourseStore::connect(
            &config.server.database_url,
            config.server.max_connections,
        )
        .await?;
        tracing::info!("Database connection established");

        Ok(Self::with_backends(
            config,
            Arc::new(GeminiClient::from_config(&config.generation)?),
            Arc::new(YouTubeClient::from_config(&config.video_search)?),
            Arc::new(store),
            Arc::new(RazorpayClient::from_config(&config.payment)?),
        ))
    }

    pub fn with_backends(
        config: &AppConfig,
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn VideoSearch>,
        store: Arc<dyn CourseStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let generation = GenerationClient::new(
            generator,
            config.generation.models.clone(),
            config.generation.retry_policy(),
            config.generation.parameters(),
        );

        let pipeline = if config.video_search.enabled {
            CoursePipeline::new(generation, Enricher::new(search))
        } else {
            tracing::info!("Video enrichment disabled");
            CoursePipeline::without_enrichment(generation)
        };

        let courses = CourseService::new(
            store,
            Arc::new(pipeline),
            config.server.course_list_limit,
        );
        let checkout = CheckoutService::new(gateway, config.payment.clone());

        Self::new(courses, checkout)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(courses::course_routes())
        .merge(checkout::checkout_routes())
        .merge(health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
