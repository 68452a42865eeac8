use crate::domain::model::CourseOutline;
use crate::domain::ports::VideoSearch;
use std::sync::Arc;

pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

pub fn lesson_query(lesson_title: &str) -> String {
    format!("{} course", lesson_title)
}

/// Attaches a video link to every lesson, one lookup per lesson, in
/// document order. A failed lookup leaves that lesson's link empty and
/// never stops the remaining lessons.
pub struct Enricher {
    search: Arc<dyn VideoSearch>,
}

impl Enricher {
    pub fn new(search: Arc<dyn VideoSearch>) -> Self {
        Self { search }
    }

    pub async fn enrich(&self, mut outline: CourseOutline) -> CourseOutline {
        let total = outline.lesson_count();
        let mut found = 0;

        for lesson in outline.lessons_mut() {
            let query = lesson_query(&lesson.title);

            lesson.video_url = match self.search.first_video_id(&query).await {
                Ok(Some(video_id)) => {
                    found += 1;
                    Some(watch_url(&video_id))
                }
                Ok(None) => {
                    tracing::debug!("No video found for query: \"{}\"", query);
                    None
                }
                Err(e) => {
                    tracing::warn!("⚠️ Video lookup failed for \"{}\": {}", query, e);
                    None
                }
            };
        }

        tracing::info!("🎬 Enriched {}/{} lesson(s) with videos", found, total);
        outline
    }
}
