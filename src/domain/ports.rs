use crate::domain::model::{
    CheckoutOrder, CourseRecord, CourseSummary, GenerationParameters, NewCourse, OrderRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Text-generation backend. `model` names one candidate from the fallback list.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String>;
}

/// Video-search backend. Returns the identifier of the first ranked result.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn first_video_id(&self, query: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn save(&self, course: &NewCourse) -> Result<i64>;
    async fn list_by_creator(&self, created_by: &str, limit: i64) -> Result<Vec<CourseSummary>>;
    async fn find_by_course_id(&self, course_id: &str) -> Result<Option<CourseRecord>>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, order: &OrderRequest) -> Result<CheckoutOrder>;
}
