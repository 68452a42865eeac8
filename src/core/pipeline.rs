use crate::core::enrichment::Enricher;
use crate::core::generation::GenerationClient;
use crate::core::prompt::build_outline_prompt;
use crate::domain::model::{CourseOutline, CourseOutlineRequest};
use crate::utils::error::{LmsError, Result};

/// Course outline generation pipeline: prompt → generate → enrich.
///
/// Stages run strictly in sequence and nothing is shared between runs, so
/// concurrent requests for the same topic simply run twice.
pub struct CoursePipeline {
    generation: GenerationClient,
    enricher: Option<Enricher>,
}

impl CoursePipeline {
    pub fn new(generation: GenerationClient, enricher: Enricher) -> Self {
        Self {
            generation,
            enricher: Some(enricher),
        }
    }

    pub fn without_enrichment(generation: GenerationClient) -> Self {
        Self {
            generation,
            enricher: None,
        }
    }

    pub async fn run(&self, request: &CourseOutlineRequest) -> Result<CourseOutline> {
        if request.topic.trim().is_empty() {
            return Err(LmsError::validation("Course description is required."));
        }

        tracing::info!(
            "📝 Generating {} outline for topic: {}",
            request.difficulty,
            request.topic
        );

        let prompt = build_outline_prompt(&request.topic, request.difficulty);
        tracing::debug!("Prompt length: {} chars", prompt.len());

        let mut outline = self.generation.generate(&prompt).await?;
        outline.difficulty.get_or_insert(request.difficulty);

        let outline = match &self.enricher {
            Some(enricher) => enricher.enrich(outline).await,
            None => outline,
        };

        tracing::info!(
            "✅ Outline ready: {} module(s), {} lesson(s)",
            outline.modules.len(),
            outline.lesson_count()
        );
        Ok(outline)
    }
}
