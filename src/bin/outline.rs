use ai_lms::adapters::{GeminiClient, YouTubeClient};
use ai_lms::config::AppConfig;
use ai_lms::core::enrichment::Enricher;
use ai_lms::core::generation::GenerationClient;
use ai_lms::domain::model::{CourseOutlineRequest, DifficultyLevel};
use ai_lms::utils::logger;
use ai_lms::utils::validation::Validate;
use ai_lms::{CoursePipeline, Result};
use clap::Parser;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "outline")]
#[command(about = "Generate a single course outline and print it as JSON")]
struct Args {
    /// Topic or course description
    #[arg(short, long)]
    topic: String,

    /// beginner, intermediate or advanced
    #[arg(short, long, default_value = "beginner")]
    difficulty: DifficultyLevel,

    /// Skip the video lookup for each lesson
    #[arg(long)]
    no_enrich: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "LMS_CONFIG")]
    config: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    match run(&args).await {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Outline generation failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(key) = &args.gemini_api_key {
        config.generation.api_key = Some(key.clone());
    }
    if let Some(key) = &args.youtube_api_key {
        config.video_search.api_key = Some(key.clone());
    }
    config.validate()?;

    let generation = GenerationClient::new(
        Arc::new(GeminiClient::from_config(&config.generation)?),
        config.generation.models.clone(),
        config.generation.retry_policy(),
        config.generation.parameters(),
    );

    let pipeline = if args.no_enrich || !config.video_search.enabled {
        CoursePipeline::without_enrichment(generation)
    } else {
        let search = YouTubeClient::from_config(&config.video_search)?;
        CoursePipeline::new(generation, Enricher::new(Arc::new(search)))
    };

    let request = CourseOutlineRequest::new(args.topic.clone(), args.difficulty);
    let outline = pipeline.run(&request).await?;

    Ok(serde_json::to_string_pretty(&outline)?)
}
