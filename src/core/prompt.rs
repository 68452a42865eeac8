use crate::domain::model::DifficultyLevel;

const OUTPUT_SHAPE: &str = r#"Respond ONLY with a valid JSON object, with no surrounding prose or markdown, containing:
- "title": string (e.g., "Introduction to Web Development")
- "introduction": string (a brief, one-paragraph summary of the course content)
- "difficulty": "beginner" | "intermediate" | "advanced"
- "modules": array of objects, where each object has:
    - "name": string (e.g., "Module 1: HTML Basics")
    - "lessons": array of objects, where each object has:
        - "title": string (e.g., "Lesson 1.1: Introduction to HTML")
        - "duration": string (e.g., "30 min", "1 hour")
- "recommendedDuration": string (overall course duration, e.g., "8 hours", "2 weeks")

Example JSON structure:
{
  "title": "Example Course",
  "introduction": "A short overview of what the learner will cover.",
  "difficulty": "beginner",
  "modules": [
    {
      "name": "Module 1",
      "lessons": [
        {"title": "Lesson 1.1", "duration": "30 min"}
      ]
    }
  ],
  "recommendedDuration": "4 hours"
}"#;

/// Renders the generation prompt. Pure and deterministic; the caller
/// rejects an empty topic before getting here.
pub fn build_outline_prompt(topic: &str, difficulty: DifficultyLevel) -> String {
    format!(
        "Generate a comprehensive {difficulty}-level course outline based on: {topic}.\n\
         The \"difficulty\" field must be \"{difficulty}\".\n\
         {OUTPUT_SHAPE}\n",
        topic = topic.trim(),
        difficulty = difficulty,
    )
}
