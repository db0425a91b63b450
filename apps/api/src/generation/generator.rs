//! Post Generation: orchestrates the generation pipeline.
//!
//! Flow: validate → build prompt → one model call → extract posts.
//!
//! Nothing here persists. Saving a result is a separate call the client makes
//! against the posts API.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::extractor::extract_generation;
use crate::generation::prompts::build_generation_prompt;
use crate::llm_client::{GenerationError, TextGenerator};
use crate::models::post::GenerationResult;

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_AUDIENCE: &str = "general audience";

/// Request body for `POST /generate` as sent by the client. Every field is
/// optional at this stage so that missing fields become a 400 from
/// `validate` rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub topic: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub tone: Option<String>,
    pub target_audience: Option<String>,
}

/// A generation request that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub platforms: Vec<String>,
    pub tone: String,
    pub target_audience: String,
}

impl GenerateBody {
    /// Checks topic and platforms and fills in tone/audience defaults.
    pub fn validate(self) -> Result<GenerationRequest, AppError> {
        let topic = self.topic.filter(|t| !t.trim().is_empty());
        let platforms = self.platforms.filter(|p| !p.is_empty());

        let (Some(topic), Some(platforms)) = (topic, platforms) else {
            return Err(AppError::InvalidRequest(
                "Topic and at least one platform are required".to_string(),
            ));
        };

        Ok(GenerationRequest {
            topic,
            platforms,
            tone: non_blank_or(self.tone, DEFAULT_TONE),
            target_audience: non_blank_or(self.target_audience, DEFAULT_AUDIENCE),
        })
    }
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Runs prompt → model → extraction for an already validated request.
///
/// A model failure is returned as-is. Unparseable model output is NOT an
/// error: it degrades to an empty result.
pub async fn generate_posts(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<GenerationResult, GenerationError> {
    info!(
        "Generating posts for {} platform(s): {}",
        request.platforms.len(),
        request.platforms.join(", ")
    );

    let prompt = build_generation_prompt(request);
    let text = generator.generate(&prompt).await?;

    let extraction = extract_generation(&text);
    if extraction.is_empty() {
        warn!(
            "No decodable posts object in model output ({} chars); returning empty result",
            text.len()
        );
    }

    let result = extraction.into_result();
    info!("Generated {} post(s)", result.posts.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeGenerator;

    fn body(topic: Option<&str>, platforms: Option<Vec<&str>>) -> GenerateBody {
        GenerateBody {
            topic: topic.map(String::from),
            platforms: platforms.map(|p| p.into_iter().map(String::from).collect()),
            tone: None,
            target_audience: None,
        }
    }

    #[test]
    fn test_validate_applies_defaults() {
        let request = body(Some("coffee"), Some(vec!["twitter"])).validate().unwrap();
        assert_eq!(request.tone, DEFAULT_TONE);
        assert_eq!(request.target_audience, DEFAULT_AUDIENCE);
        assert_eq!(request.platforms, vec!["twitter".to_string()]);
    }

    #[test]
    fn test_validate_keeps_explicit_tone_and_audience() {
        let mut raw = body(Some("coffee"), Some(vec!["twitter"]));
        raw.tone = Some("playful".to_string());
        raw.target_audience = Some("baristas".to_string());
        let request = raw.validate().unwrap();
        assert_eq!(request.tone, "playful");
        assert_eq!(request.target_audience, "baristas");
    }

    #[test]
    fn test_validate_blank_tone_falls_back_to_default() {
        let mut raw = body(Some("coffee"), Some(vec!["twitter"]));
        raw.tone = Some("   ".to_string());
        raw.target_audience = Some(String::new());
        let request = raw.validate().unwrap();
        assert_eq!(request.tone, DEFAULT_TONE);
        assert_eq!(request.target_audience, DEFAULT_AUDIENCE);
    }

    #[test]
    fn test_validate_rejects_missing_or_blank_topic() {
        for topic in [None, Some(""), Some("  \t")] {
            let err = body(topic, Some(vec!["twitter"])).validate().unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
    }

    #[test]
    fn test_validate_rejects_missing_or_empty_platforms() {
        for platforms in [None, Some(vec![])] {
            let err = body(Some("coffee"), platforms).validate().unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
    }

    #[test]
    fn test_body_deserializes_camel_case() {
        let raw: GenerateBody = serde_json::from_str(
            r#"{"topic": "coffee", "platforms": ["twitter"], "targetAudience": "students"}"#,
        )
        .unwrap();
        assert_eq!(raw.target_audience.as_deref(), Some("students"));
        assert!(raw.tone.is_none());
    }

    #[tokio::test]
    async fn test_generate_posts_calls_model_once_with_prompt() {
        let generator = FakeGenerator::replying(
            r#"Here: {"posts": [{"platform": "twitter", "content": "Coffee time", "hashtags": ["coffee"], "bestTime": "8 AM"}]}"#,
        );
        let request = body(Some("coffee"), Some(vec!["twitter"])).validate().unwrap();

        let result = generate_posts(&generator, &request).await.unwrap();

        assert_eq!(generator.calls(), 1);
        assert_eq!(result.posts.len(), 1);
        assert_eq!(result.posts[0].best_time, "8 AM");
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("coffee"));
        assert!(prompt.contains("twitter"));
    }

    #[tokio::test]
    async fn test_generate_posts_degrades_to_empty_on_prose() {
        let generator = FakeGenerator::replying("I could not think of anything.");
        let request = body(Some("coffee"), Some(vec!["twitter"])).validate().unwrap();

        let result = generate_posts(&generator, &request).await.unwrap();
        assert!(result.posts.is_empty());
    }

    #[tokio::test]
    async fn test_generate_posts_propagates_model_failure() {
        let generator = FakeGenerator::failing();
        let request = body(Some("coffee"), Some(vec!["twitter"])).validate().unwrap();

        let err = generate_posts(&generator, &request).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyContent));
        assert_eq!(generator.calls(), 1);
    }
}
