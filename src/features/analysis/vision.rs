//! Vision-backed image analyzer.
//!
//! Sends the photo to an OpenAI-compatible chat-completions endpoint together
//! with a prompt carrying the canonical category vocabulary and the expected
//! response schema, then parses and validates the model's JSON reply. Every
//! provider, parse, or vocabulary failure surfaces as an error; the upload
//! pipeline decides what to do with it.

use async_trait::async_trait;
use base64::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::AnalyzerConfig;
use crate::core::error::{AppError, Result};
use crate::features::analysis::analyzer::{ImageAnalyzer, IssueClassification};
use crate::features::categories::registry;
use crate::features::issues::models::IssueSeverity;
use crate::shared::llm::{parse_llm_json, LlmResponse};
use crate::shared::prompts::render_template;

/// Response shape the model is asked to produce
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[schemars(title = "IssueClassification")]
struct ClassificationResponse {
    #[schemars(description = "Exactly one of the listed category labels")]
    main_category: String,

    #[schemars(description = "Short free-text name for the specific problem")]
    sub_category: String,

    #[schemars(description = "Severity level: low, medium, or high")]
    severity: IssueSeverity,

    #[serde(default)]
    #[schemars(description = "Short risk tags, e.g. safety, health, environment")]
    risks: Vec<String>,

    #[schemars(description = "One or two sentences describing what is visible")]
    description: String,
}

impl LlmResponse for ClassificationResponse {}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Analyzer backed by an OpenAI-compatible vision endpoint
pub struct VisionAnalyzer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl VisionAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let api_key = config.vision_api_key.clone().ok_or_else(|| {
            AppError::Internal("Vision analyzer requires VISION_API_KEY".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.vision_base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.vision_model.clone(),
        })
    }

    /// Render the classification prompt: vocabulary plus response schema
    fn build_prompt() -> Result<String> {
        render_template(
            "classify_issue.jinja",
            minijinja::context! {
                categories => registry::MAIN_CATEGORIES
                    .iter()
                    .map(|c| minijinja::context! { label => c.label, description => c.description })
                    .collect::<Vec<_>>(),
                schema => ClassificationResponse::json_schema_string(),
            },
        )
        .map_err(|e| AppError::Internal(format!("Failed to render classification prompt: {}", e)))
    }

    /// Check the model's reply against the classification contract
    fn validate_response(response: ClassificationResponse) -> Result<IssueClassification> {
        if !registry::is_canonical_label(&response.main_category) {
            return Err(AppError::ExternalServiceError(format!(
                "Vision provider returned unknown category '{}'",
                response.main_category
            )));
        }

        Ok(IssueClassification {
            main_category: response.main_category,
            sub_category: response.sub_category,
            severity: response.severity,
            risks: response.risks,
            description: response.description,
        })
    }

    async fn request_completion(&self, prompt: String, image_data_url: String) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image_data_url,
                        },
                    },
                ],
            }],
            max_tokens: 800,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Vision provider request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Vision provider returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Invalid vision provider response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::ExternalServiceError(
                    "Vision provider response contained no content".to_string(),
                )
            })
    }
}

#[async_trait]
impl ImageAnalyzer for VisionAnalyzer {
    async fn analyze(&self, image: &[u8], content_type: &str) -> Result<IssueClassification> {
        let prompt = Self::build_prompt()?;
        let data_url = format!("data:{};base64,{}", content_type, BASE64_STANDARD.encode(image));

        let content = self.request_completion(prompt, data_url).await?;

        let response = parse_llm_json::<ClassificationResponse>(&content).map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse vision response: {}", e))
        })?;

        Self::validate_response(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_contains_vocabulary_and_schema() {
        let prompt = VisionAnalyzer::build_prompt().unwrap();

        for category in registry::MAIN_CATEGORIES {
            assert!(prompt.contains(category.label), "missing {}", category.label);
        }
        assert!(prompt.contains("main_category"));
        assert!(prompt.contains("sub_category"));
        assert!(prompt.contains("severity"));
        assert!(prompt.contains("risks"));
        assert!(prompt.contains("description"));
    }

    #[test]
    fn test_classification_response_parses_from_markdown() {
        let text = r#"```json
{
  "main_category": "Water & Sanitation",
  "sub_category": "Leaking pipe",
  "severity": "medium",
  "risks": ["health"],
  "description": "Water leaking across the pavement."
}
```"#;

        let response = parse_llm_json::<ClassificationResponse>(text).unwrap();
        assert_eq!(response.main_category, "Water & Sanitation");
        assert_eq!(response.severity, IssueSeverity::Medium);
    }

    #[test]
    fn test_missing_risks_defaults_to_empty() {
        let text = r#"{"main_category": "Other", "sub_category": "Unknown", "severity": "low", "description": "Unclear photo."}"#;
        let response = parse_llm_json::<ClassificationResponse>(text).unwrap();
        assert!(response.risks.is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let response = ClassificationResponse {
            main_category: "Potholes".to_string(),
            sub_category: "Pothole".to_string(),
            severity: IssueSeverity::High,
            risks: vec![],
            description: "A pothole.".to_string(),
        };

        let result = VisionAnalyzer::validate_response(response);
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[test]
    fn test_canonical_category_is_accepted() {
        let response = ClassificationResponse {
            main_category: "Safety & Hazards".to_string(),
            sub_category: "Exposed wiring".to_string(),
            severity: IssueSeverity::High,
            risks: vec!["safety".to_string()],
            description: "Exposed electrical wiring at street level.".to_string(),
        };

        let classification = VisionAnalyzer::validate_response(response).unwrap();
        assert_eq!(classification.main_category, "Safety & Hazards");
    }
}
