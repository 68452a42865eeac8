use crate::domain::model::{CourseOutline, CourseRecord, CourseSummary, NewCourse};
use crate::domain::ports::CourseStore;
use crate::utils::error::{LmsError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

/// Course persistence in the `study_materials` table.
#[derive(Clone)]
pub struct SqliteCourseStore {
    pool: SqlitePool,
}

impl SqliteCourseStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        tracing::debug!("Connecting to database: {}", database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init_tables().await?;
        Ok(store)
    }

    /// Single-connection in-memory database; every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_tables().await?;
        Ok(store)
    }

    async fn init_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS study_materials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id TEXT NOT NULL UNIQUE,
                course_type TEXT NOT NULL,
                topic TEXT NOT NULL,
                difficulty_level TEXT NOT NULL,
                created_by TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_study_materials_creator ON study_materials (created_by, created_at)",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Database tables initialized (study_materials)");
        Ok(())
    }
}

fn summary_from_row(row: &SqliteRow) -> Result<CourseSummary> {
    Ok(CourseSummary {
        id: row.try_get("id")?,
        course_id: row.try_get("course_id")?,
        course_type: row.try_get("course_type")?,
        topic: row.try_get("topic")?,
        difficulty: row.try_get("difficulty_level")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn save(&self, course: &NewCourse) -> Result<i64> {
        // 連線前先序列化
        let content = serde_json::to_string(&course.content)?;
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true);

        let result = sqlx::query(
            r#"
            INSERT INTO study_materials (
                course_id, course_type, topic, difficulty_level,
                created_by, content, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.course_id)
        .bind(&course.course_type)
        .bind(&course.topic)
        .bind(course.difficulty.as_str())
        .bind(&course.created_by)
        .bind(&content)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => LmsError::Conflict {
                message: format!("Course {} already exists.", course.course_id),
            },
            other => LmsError::DatabaseError(other),
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn list_by_creator(&self, created_by: &str, limit: i64) -> Result<Vec<CourseSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, course_type, topic, difficulty_level,
                   created_by, created_at, updated_at
            FROM study_materials
            WHERE created_by = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(created_by)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn find_by_course_id(&self, course_id: &str) -> Result<Option<CourseRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, course_id, course_type, topic, difficulty_level,
                   created_by, created_at, updated_at, content
            FROM study_materials
            WHERE course_id = ?
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let content: String = row.try_get("content")?;
                let content: CourseOutline = serde_json::from_str(&content)?;
                Ok(Some(CourseRecord {
                    summary: summary_from_row(&row)?,
                    content,
                }))
            }
            None => Ok(None),
        }
    }
}
