//! Course routes: outline generation, saving, listing and details.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::core::courses::SaveCourseInput;
use crate::domain::model::{CourseOutline, CourseOutlineRequest, CourseRecord, CourseSummary, DifficultyLevel};
use crate::utils::error::LmsError;
use crate::utils::validation::require_field;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutlineBody {
    #[serde(alias = "courseDescription")]
    pub topic: Option<String>,
    pub difficulty_level: Option<String>,
    pub study_type: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutlineResponse {
    pub success: bool,
    pub result: CourseOutline,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveCourseResponse {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesBody {
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse<T> {
    pub success: bool,
    pub result: T,
}

impl GenerateOutlineBody {
    fn into_request(self) -> ApiResult<(CourseOutlineRequest, Option<String>)> {
        let topic = require_field("topic", self.topic.as_deref())
            .map_err(|_| LmsError::validation("Course description is required."))?;

        let difficulty = match self.difficulty_level.as_deref().map(str::trim) {
            Some(level) if !level.is_empty() => level.parse()?,
            _ => DifficultyLevel::default(),
        };

        let mut request = CourseOutlineRequest::new(topic, difficulty);
        if let Some(study_type) = self.study_type {
            request = request.with_study_type(study_type);
        }

        Ok((request, self.created_by))
    }
}

/// POST /api/generate-course-outline
pub async fn generate_course_outline(
    State(state): State<AppState>,
    payload: Result<Json<GenerateOutlineBody>, JsonRejection>,
) -> ApiResult<Json<GenerateOutlineResponse>> {
    let Json(body) = payload?;
    let (request, created_by) = body.into_request()?;

    let generated = state.courses.generate(&request, created_by.as_deref()).await?;

    let (course_id, id) = match generated.saved {
        Some(saved) => (Some(saved.course_id), Some(saved.id)),
        None => (None, None),
    };

    Ok(Json(GenerateOutlineResponse {
        success: true,
        result: generated.outline,
        course_id,
        id,
    }))
}

/// POST /api/save-course
pub async fn save_course(
    State(state): State<AppState>,
    payload: Result<Json<SaveCourseInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaveCourseResponse>)> {
    let Json(input) = payload?;
    let id = state.courses.save_course(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveCourseResponse {
            success: true,
            message: "Course saved successfully!".to_string(),
            id,
        }),
    ))
}

/// POST /api/courses
pub async fn list_courses(
    State(state): State<AppState>,
    payload: Result<Json<ListCoursesBody>, JsonRejection>,
) -> ApiResult<Json<ResultResponse<Vec<CourseSummary>>>> {
    let Json(body) = payload?;
    let courses = state.courses.list_courses(body.created_by.as_deref()).await?;

    Ok(Json(ResultResponse {
        success: true,
        result: courses,
    }))
}

/// GET /api/course-details/:course_id
pub async fn course_details(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<ResultResponse<CourseRecord>>> {
    let record = state.courses.course_details(&course_id).await?;

    Ok(Json(ResultResponse {
        success: true,
        result: record,
    }))
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate-course-outline", post(generate_course_outline))
        .route("/api/save-course", post(save_course))
        .route("/api/courses", post(list_courses))
        .route("/api/course-details/:course_id", get(course_details))
}
