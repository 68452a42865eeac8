use ai_lms::adapters::{GeminiClient, RazorpayClient, SqliteCourseStore, YouTubeClient};
use ai_lms::{build_router, AppConfig, AppState};
use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct Backends {
    gemini: MockServer,
    youtube: MockServer,
    razorpay: MockServer,
}

impl Backends {
    async fn start() -> Self {
        Self {
            gemini: MockServer::start_async().await,
            youtube: MockServer::start_async().await,
            razorpay: MockServer::start_async().await,
        }
    }
}

fn outline_json() -> Value {
    json!({
        "title": "Rust Ownership",
        "introduction": "Memory safety without a garbage collector.",
        "difficulty": "beginner",
        "modules": [
            {
                "name": "Basics",
                "lessons": [
                    { "title": "Ownership", "duration": "20 minutes" },
                    { "title": "Borrowing", "duration": "25 minutes" }
                ]
            }
        ],
        "recommendedDuration": "1 week"
    })
}

fn gemini_reply(outline: &Value) -> Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": outline.to_string() } ] } }
        ]
    })
}

/// 寫入 TOML 設定檔再讀回來，與部署時相同的載入路徑
fn load_config(backends: &Backends, gemini_key: &str, payment_keys: bool) -> Result<(TempDir, AppConfig)> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("ai-lms.toml");

    let payment = if payment_keys {
        "key_id = \"rzp_test\"\nkey_secret = \"shh\""
    } else {
        ""
    };

    let content = format!(
        r#"
[server]
course_list_limit = 10

[generation]
endpoint = "{}"
api_key = "{}"
models = ["primary-model", "backup-model"]
max_attempts = 3
base_delay_ms = 1
timeout_seconds = 5

[video_search]
endpoint = "{}"
api_key = "yt-key"

[payment]
endpoint = "{}"
{}
"#,
        backends.gemini.base_url(),
        gemini_key,
        backends.youtube.base_url(),
        backends.razorpay.base_url(),
        payment,
    );
    std::fs::write(&config_path, content)?;

    let config = AppConfig::from_file(&config_path)?;
    Ok((temp_dir, config))
}

async fn app_state(config: &AppConfig) -> Result<AppState> {
    Ok(AppState::with_backends(
        config,
        Arc::new(GeminiClient::from_config(&config.generation)?),
        Arc::new(YouTubeClient::from_config(&config.video_search)?),
        Arc::new(SqliteCourseStore::in_memory().await?),
        Arc::new(RazorpayClient::from_config(&config.payment)?),
    ))
}

async fn send(state: &AppState, method: &str, uri: &str, body: Option<&str>) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))?;

    let response = build_router(state.clone()).oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_generate_outline_enriches_lessons_without_saving() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;

    let gemini = backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/primary-model:generateContent")
                .header("x-goog-api-key", "gemini-key");
            then.status(200).json_body(gemini_reply(&outline_json()));
        })
        .await;
    let ownership = backends
        .youtube
        .mock_async(|when, then| {
            when.method(GET)
                .path("/youtube/v3/search")
                .query_param("q", "Ownership course")
                .header("x-goog-api-key", "yt-key");
            then.status(200)
                .json_body(json!({ "items": [ { "id": { "videoId": "own123" } } ] }));
        })
        .await;
    let borrowing = backends
        .youtube
        .mock_async(|when, then| {
            when.method(GET)
                .path("/youtube/v3/search")
                .query_param("q", "Borrowing course");
            then.status(200).json_body(json!({ "items": [] }));
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/generate-course-outline",
        Some(r#"{"topic": "Rust ownership", "difficultyLevel": "Beginner"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("courseId").is_none());

    let lessons = &body["result"]["modules"][0]["lessons"];
    assert_eq!(lessons[0]["videoUrl"], "https://www.youtube.com/watch?v=own123");
    assert_eq!(lessons[1]["videoUrl"], Value::Null);
    assert_eq!(body["result"]["title"], "Rust Ownership");

    gemini.assert_async().await;
    ownership.assert_async().await;
    borrowing.assert_async().await;

    // 沒有 createdBy 就不會寫入資料庫
    let (_, listed) = send(
        &state,
        "POST",
        "/api/courses",
        Some(r#"{"createdBy": "learner@example.com"}"#),
    )
    .await?;
    assert_eq!(listed["result"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_generate_with_creator_persists_course() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;

    backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST).path_contains(":generateContent");
            then.status(200).json_body(gemini_reply(&outline_json()));
        })
        .await;
    backends
        .youtube
        .mock_async(|when, then| {
            when.method(GET).path("/youtube/v3/search");
            then.status(200)
                .json_body(json!({ "items": [ { "id": { "videoId": "vid42" } } ] }));
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/generate-course-outline",
        Some(r#"{"courseDescription": "Rust ownership", "difficultyLevel": "intermediate", "createdBy": "learner@example.com"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    let course_id = body["courseId"].as_str().unwrap_or_default().to_string();
    assert!(!course_id.is_empty());

    let (status, listed) = send(
        &state,
        "POST",
        "/api/courses",
        Some(r#"{"createdBy": "learner@example.com"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let courses = listed["result"].as_array().cloned().unwrap_or_default();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["courseId"], course_id.as_str());
    assert_eq!(courses[0]["courseDescription"], "Rust ownership");
    assert_eq!(courses[0]["difficultyLevel"], "intermediate");
    assert!(courses[0].get("content").is_none());

    let (status, details) = send(&state, "GET", &format!("/api/course-details/{}", course_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["result"]["courseId"], course_id.as_str());
    assert_eq!(
        details["result"]["content"]["modules"][0]["lessons"][1]["videoUrl"],
        "https://www.youtube.com/watch?v=vid42"
    );
    Ok(())
}

#[tokio::test]
async fn test_save_course_then_conflict_and_missing_data() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;
    let state = app_state(&config).await?;

    let payload = json!({
        "courseId": "course-1",
        "courseDescription": "Rust ownership",
        "difficultyLevel": "advanced",
        "studyType": "course",
        "createdBy": "learner@example.com",
        "aiGeneratedContent": outline_json(),
    })
    .to_string();

    let (status, body) = send(&state, "POST", "/api/save-course", Some(&payload)).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Course saved successfully!");
    assert!(body["id"].as_i64().unwrap_or_default() > 0);

    let (status, body) = send(&state, "POST", "/api/save-course", Some(&payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // 另一位使用者用相同 courseId 儲存，不能蓋掉或混入原本的課程
    let other = payload.replace("learner@example.com", "someone-else@example.com");
    let (status, _) = send(&state, "POST", "/api/save-course", Some(&other)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, details) = send(&state, "GET", "/api/course-details/course-1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["result"]["createdBy"], "learner@example.com");

    let (status, body) = send(
        &state,
        "POST",
        "/api/save-course",
        Some(r#"{"courseId": "course-2", "createdBy": "learner@example.com"}"#),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required course data for saving.");
    Ok(())
}

#[tokio::test]
async fn test_list_requires_creator_and_details_unknown_is_404() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;
    let state = app_state(&config).await?;

    let (status, body) = send(&state, "POST", "/api/courses", Some("{}")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User identifier ('createdBy') is required to fetch courses.");

    let (status, body) = send(&state, "GET", "/api/course-details/does-not-exist", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_empty_topic_rejected_before_any_backend_call() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;

    let gemini = backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(gemini_reply(&outline_json()));
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/generate-course-outline",
        Some(r#"{"topic": "   ", "difficultyLevel": "beginner"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "success": false, "error": "Course description is required." }));
    assert_eq!(gemini.hits_async().await, 0);

    let (status, body) = send(&state, "POST", "/api/generate-course-outline", Some("{not json")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(gemini.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_gemini_key_is_configuration_error() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "${AI_LMS_TEST_UNSET_GEMINI_KEY}", false)?;
    assert!(config.missing_credentials().contains(&"GEMINI_API_KEY"));

    let gemini = backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(gemini_reply(&outline_json()));
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/generate-course-outline",
        Some(r#"{"topic": "Rust ownership"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Server configuration error: service not available. Please contact support."
    );
    assert_eq!(gemini.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_overloaded_backend_exhausts_every_candidate() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;

    let gemini = backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST).path_contains(":generateContent");
            then.status(503)
                .body(r#"{"error": {"message": "The model is overloaded."}}"#);
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/generate-course-outline",
        Some(r#"{"topic": "Rust ownership"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap_or_default().contains("overloaded"));
    // 兩個候選模型，各三次
    assert_eq!(gemini.hits_async().await, 6);
    Ok(())
}

#[tokio::test]
async fn test_falls_back_to_next_model_after_retries() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;

    let primary = backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/primary-model:generateContent");
            then.status(200).json_body(json!({
                "candidates": [ { "content": { "parts": [ { "text": "not an outline" } ] } } ]
            }));
        })
        .await;
    let backup = backends
        .gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/backup-model:generateContent");
            then.status(200).json_body(gemini_reply(&outline_json()));
        })
        .await;
    backends
        .youtube
        .mock_async(|when, then| {
            when.method(GET);
            then.status(500);
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/generate-course-outline",
        Some(r#"{"topic": "Rust ownership", "difficultyLevel": "advanced"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(primary.hits_async().await, 3);
    assert_eq!(backup.hits_async().await, 1);

    // 影片查詢失敗不影響大綱
    assert_eq!(body["result"]["modules"][0]["lessons"][0]["videoUrl"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_checkout_creates_configured_order() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", true)?;

    let orders = backends
        .razorpay
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/orders")
                .header_exists("authorization")
                .json_body_partial(r#"{"amount": 10000, "currency": "USD", "payment_capture": 1}"#);
            then.status(200).json_body(json!({
                "id": "order_test_1",
                "amount": 10000,
                "currency": "USD",
                "status": "created"
            }));
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(
        &state,
        "POST",
        "/api/create-checkout-session",
        Some(r#"{"userId": "learner@example.com", "planName": "premium"}"#),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "orderId": "order_test_1", "amount": 10000, "currency": "USD" })
    );
    orders.assert_async().await;

    // 沒有 body 也能下單
    let (status, _) = send(&state, "POST", "/api/create-checkout-session", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.hits_async().await, 2);

    // 有內容但不是 JSON 就不能下單
    let (status, body) = send(&state, "POST", "/api/create-checkout-session", Some("{not json")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(orders.hits_async().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_checkout_without_keys_fails_without_calling_gateway() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;

    let orders = backends
        .razorpay
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200);
        })
        .await;

    let state = app_state(&config).await?;
    let (status, body) = send(&state, "POST", "/api/create-checkout-session", Some("{}")).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(orders.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_health_reports_service() -> Result<()> {
    let backends = Backends::start().await;
    let (_dir, config) = load_config(&backends, "gemini-key", false)?;
    let state = app_state(&config).await?;

    let (status, body) = tokio_test::assert_ok!(send(&state, "GET", "/health", None).await);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ai-lms");
    Ok(())
}
