//! Generation client: ordered candidate fallback with bounded retry.
//!
//! Each candidate gets up to `max_attempts` tries. After a failed attempt
//! `i` (0-based) the client sleeps `base_delay * 2^i` before trying the same
//! candidate again; once the attempts are used up it moves to the next
//! candidate from attempt 1. A response only counts as a success when its
//! body parses strictly as a [`CourseOutline`].

use crate::domain::model::{CourseOutline, GenerationParameters};
use crate::domain::ports::TextGenerator;
use crate::utils::error::{LmsError, Result};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after the failed attempt with this 0-based index.
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

pub struct GenerationClient {
    generator: Arc<dyn TextGenerator>,
    candidates: Vec<String>,
    policy: RetryPolicy,
    parameters: GenerationParameters,
}

impl GenerationClient {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        candidates: Vec<String>,
        policy: RetryPolicy,
        parameters: GenerationParameters,
    ) -> Self {
        Self {
            generator,
            candidates,
            policy,
            parameters,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub async fn generate(&self, prompt: &str) -> Result<CourseOutline> {
        self.generate_with_candidates(prompt, &self.candidates).await
    }

    pub async fn generate_with_candidates(
        &self,
        prompt: &str,
        candidates: &[String],
    ) -> Result<CourseOutline> {
        if candidates.is_empty() {
            return Err(LmsError::ConfigError {
                message: "No generation candidates configured".to_string(),
            });
        }

        let mut attempts_used = 0;
        let mut last_error = None;

        for model in candidates {
            tracing::info!("🤖 Attempting generation with model: {}", model);

            match self.generate_with_retry(model, prompt).await {
                Ok((outline, attempts)) => {
                    tracing::info!(
                        "✅ Model {} produced an outline with {} module(s) after {} attempt(s)",
                        model,
                        outline.modules.len(),
                        attempts
                    );
                    return Ok(outline);
                }
                Err((err, attempts)) => {
                    attempts_used += attempts;
                    if !err.is_retryable() {
                        // 設定錯誤：換模型也不會成功
                        tracing::error!("❌ Generation aborted on model {}: {}", model, err);
                        return Err(err);
                    }
                    tracing::warn!("⚠️ Model {} failed after {} attempt(s): {}", model, attempts, err);
                    last_error = Some(err);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| {
            LmsError::invalid_response("All configured AI models failed to generate a response.")
        });

        Err(LmsError::GenerationFailed {
            candidates: candidates.len(),
            attempts: attempts_used,
            last: Box::new(last),
        })
    }

    /// Returns the outline or the final error, each with the number of
    /// attempts spent on this candidate.
    async fn generate_with_retry(
        &self,
        model: &str,
        prompt: &str,
    ) -> std::result::Result<(CourseOutline, u32), (LmsError, u32)> {
        let mut attempt_index = 0;

        loop {
            let attempt = attempt_index + 1;
            let outcome = match self
                .generator
                .generate_text(model, prompt, &self.parameters)
                .await
            {
                Ok(body) => parse_outline(&body),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(outline) => return Ok((outline, attempt)),
                Err(err) if !err.is_retryable() => return Err((err, attempt)),
                Err(err) => {
                    tracing::warn!(
                        "Attempt {}/{} with model {} failed: {}",
                        attempt,
                        self.policy.max_attempts,
                        model,
                        err
                    );

                    if attempt >= self.policy.max_attempts {
                        return Err((err, attempt));
                    }

                    let delay = self.policy.delay_after(attempt_index);
                    tracing::debug!("Retrying model {} in {:?}", model, delay);
                    tokio::time::sleep(delay).await;
                    attempt_index += 1;
                }
            }
        }
    }
}

/// Strict parse; anything that is not a JSON object with `modules` is an
/// attempt failure.
pub fn parse_outline(body: &str) -> Result<CourseOutline> {
    if body.trim().is_empty() {
        return Err(LmsError::invalid_response("Empty body from generative model"));
    }
    serde_json::from_str(body)
        .map_err(|e| LmsError::invalid_response(format!("Outline is not valid JSON: {}", e)))
}
