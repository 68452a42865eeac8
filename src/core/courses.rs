use crate::core::pipeline::CoursePipeline;
use crate::domain::model::{
    CourseOutline, CourseOutlineRequest, CourseRecord, CourseSummary, DifficultyLevel, NewCourse,
};
use crate::domain::ports::CourseStore;
use crate::utils::error::{LmsError, Result};
use crate::utils::validation::require_field;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a save request, as the web client posts it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCourseInput {
    pub course_id: Option<String>,
    #[serde(alias = "topic")]
    pub course_description: Option<String>,
    pub difficulty_level: Option<String>,
    pub study_type: Option<String>,
    pub created_by: Option<String>,
    pub ai_generated_content: Option<CourseOutline>,
}

/// Outcome of a generation request; `saved` is set when the outline was
/// persisted for a creator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCourse {
    pub outline: CourseOutline,
    pub saved: Option<SavedCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCourse {
    pub id: i64,
    pub course_id: String,
}

pub struct CourseService {
    store: Arc<dyn CourseStore>,
    pipeline: Arc<CoursePipeline>,
    list_limit: i64,
}

impl CourseService {
    pub fn new(store: Arc<dyn CourseStore>, pipeline: Arc<CoursePipeline>, list_limit: i64) -> Self {
        Self {
            store,
            pipeline,
            list_limit,
        }
    }

    /// Runs the pipeline and, when a creator is given, persists the enriched
    /// outline under a fresh course id.
    pub async fn generate(
        &self,
        request: &CourseOutlineRequest,
        created_by: Option<&str>,
    ) -> Result<GeneratedCourse> {
        let outline = self.pipeline.run(request).await?;

        let created_by = created_by.map(str::trim).filter(|c| !c.is_empty());
        let saved = match created_by {
            Some(creator) => {
                let course = NewCourse {
                    course_id: uuid::Uuid::new_v4().to_string(),
                    course_type: request.study_type.clone(),
                    topic: request.topic.clone(),
                    difficulty: request.difficulty,
                    created_by: creator.to_string(),
                    content: outline.clone(),
                };
                let id = self.store.save(&course).await?;
                tracing::info!("💾 Saved generated course {} (row {})", course.course_id, id);
                Some(SavedCourse {
                    id,
                    course_id: course.course_id,
                })
            }
            None => None,
        };

        Ok(GeneratedCourse { outline, saved })
    }

    pub async fn save_course(&self, input: SaveCourseInput) -> Result<i64> {
        let course = Self::validate_save_input(input)?;
        let id = self.store.save(&course).await?;
        tracing::info!("💾 Saved course {} for {} (row {})", course.course_id, course.created_by, id);
        Ok(id)
    }

    fn validate_save_input(input: SaveCourseInput) -> Result<NewCourse> {
        let missing = || LmsError::validation("Missing required course data for saving.");

        let course_id = require_field("courseId", input.course_id.as_deref()).map_err(|_| missing())?;
        let topic = require_field("courseDescription", input.course_description.as_deref())
            .map_err(|_| missing())?;
        let difficulty = require_field("difficultyLevel", input.difficulty_level.as_deref())
            .map_err(|_| missing())?;
        let study_type =
            require_field("studyType", input.study_type.as_deref()).map_err(|_| missing())?;
        let created_by =
            require_field("createdBy", input.created_by.as_deref()).map_err(|_| missing())?;

        let difficulty: DifficultyLevel = difficulty.parse()?;

        Ok(NewCourse {
            course_id: course_id.to_string(),
            course_type: study_type.to_string(),
            topic: topic.to_string(),
            difficulty,
            created_by: created_by.to_string(),
            content: input.ai_generated_content.ok_or_else(missing)?,
        })
    }

    pub async fn list_courses(&self, created_by: Option<&str>) -> Result<Vec<CourseSummary>> {
        let created_by = require_field("createdBy", created_by).map_err(|_| {
            LmsError::validation("User identifier ('createdBy') is required to fetch courses.")
        })?;

        let courses = self.store.list_by_creator(created_by, self.list_limit).await?;
        tracing::debug!("Found {} course(s) for {}", courses.len(), created_by);
        Ok(courses)
    }

    pub async fn course_details(&self, course_id: &str) -> Result<CourseRecord> {
        let course_id = require_field("courseId", Some(course_id))
            .map_err(|_| LmsError::validation("Course ID is required."))?;

        self.store
            .find_by_course_id(course_id)
            .await?
            .ok_or_else(|| LmsError::NotFound {
                message: format!("Course {} was not found.", course_id),
            })
    }
}
