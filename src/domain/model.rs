use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::LmsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = LmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(LmsError::ValidationError {
                message: format!(
                    "Unsupported difficulty level '{}'. Expected beginner, intermediate or advanced.",
                    other
                ),
            }),
        }
    }
}

// 模型有時回傳 "Beginner"，大小寫不敏感
impl<'de> Deserialize<'de> for DifficultyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 模型輸出的難度可能是自由文字（例如 "Beginner to Intermediate"），
/// 無法辨識時當作未提供，由 pipeline 補上請求的難度
fn lenient_difficulty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DifficultyLevel>, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(|level| level.parse().ok()))
}

/// 一次生成請求的輸入，每次呼叫時建構
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseOutlineRequest {
    pub topic: String,
    pub difficulty: DifficultyLevel,
    pub study_type: String,
}

const DEFAULT_STUDY_TYPE: &str = "course";

// 前後空白在這裡統一去掉，之後的 prompt 與儲存都直接使用
impl CourseOutlineRequest {
    pub fn new(topic: impl Into<String>, difficulty: DifficultyLevel) -> Self {
        Self {
            topic: topic.into().trim().to_string(),
            difficulty,
            study_type: DEFAULT_STUDY_TYPE.to_string(),
        }
    }

    /// A blank study type keeps the default.
    pub fn with_study_type(mut self, study_type: impl Into<String>) -> Self {
        let study_type = study_type.into();
        let study_type = study_type.trim();
        if !study_type.is_empty() {
            self.study_type = study_type.to_string();
        }
        self
    }
}

/// Structured course document produced by the generation backend.
///
/// Only `modules` is required when parsing backend output; the remaining
/// fields fall back to empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOutline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<DifficultyLevel>,
    pub modules: Vec<Module>,
    #[serde(default)]
    pub recommended_duration: String,
}

impl CourseOutline {
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Lessons in document order: module order, then lesson order.
    pub fn lessons_mut(&mut self) -> impl Iterator<Item = &mut Lesson> {
        self.modules.iter_mut().flat_map(|m| m.lessons.iter_mut())
    }

    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub title: String,
    #[serde(default)]
    pub duration: String,
    // 只有 enrichment 會寫入這個欄位
    #[serde(default, alias = "youtubeUrl")]
    pub video_url: Option<String>,
}

/// Sampling parameters sent with every generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "application/json".to_string(),
        }
    }
}

/// A course ready to be handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub course_id: String,
    pub course_type: String,
    pub topic: String,
    pub difficulty: DifficultyLevel,
    pub created_by: String,
    pub content: CourseOutline,
}

/// List projection of a stored course; the outline blob is left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: i64,
    pub course_id: String,
    pub course_type: String,
    #[serde(rename = "courseDescription")]
    pub topic: String,
    #[serde(rename = "difficultyLevel")]
    pub difficulty: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    #[serde(flatten)]
    pub summary: CourseSummary,
    pub content: CourseOutline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    pub payment_capture: u8,
    pub notes: OrderNotes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotes {
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Order handle returned by the payment gateway; opens the client-side checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}
