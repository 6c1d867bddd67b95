use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use super::http::{ProviderEndpoint, post_json_with_retries};
use crate::repair::types::AnalysisResult;
use crate::store::ImageFormat;

/// Default chat model used for image analysis.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a facility maintenance assistant for a dormitory. \
Look at the photo and describe the broken facility. Respond with a single JSON object \
with exactly these keys: \"item\" (the broken object), \"issue\" (what is wrong), \
\"severity\" (one of CRITICAL, HIGH, MEDIUM, LOW), \"priority_score\" (integer 1-10, \
10 is most urgent), \"reasoning\" (why this priority), \"description\" (one or two \
sentences for the repair staff). No other text.";

const USER_PROMPT: &str = "Analyze this repair issue.";

#[async_trait]
/// Produces an [`AnalysisResult`] from a repair photo.
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze(&self, image: &[u8]) -> ProviderResult<AnalysisResult>;
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
/// Vision analysis through an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpVisionAnalyzer {
    http: HttpClient,
    endpoint: ProviderEndpoint,
    model: String,
}

impl HttpVisionAnalyzer {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self {
            http: endpoint.build_client(),
            endpoint,
            model: DEFAULT_VISION_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl VisionAnalyzer for HttpVisionAnalyzer {
    async fn analyze(&self, image: &[u8]) -> ProviderResult<AnalysisResult> {
        if image.is_empty() {
            return Err(ProviderError::InvalidInput {
                reason: "cannot analyze an empty image".to_string(),
            });
        }

        let data_url = format!(
            "data:{};base64,{}",
            ImageFormat::detect(image).mime_type(),
            BASE64.encode(image)
        );

        let request = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": USER_PROMPT },
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ],
            "response_format": { "type": "json_object" }
        });

        debug!(model = %self.model, bytes = image.len(), "Requesting image analysis");

        let response: ChatCompletionResponse =
            post_json_with_retries(&self.http, &self.endpoint, "chat/completions", &request)
                .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                reason: "chat completion contained no message content".to_string(),
            })?;

        parse_analysis(&content)
    }
}

/// Parses model output into an [`AnalysisResult`], tolerating a Markdown code fence.
pub fn parse_analysis(content: &str) -> ProviderResult<AnalysisResult> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str::<AnalysisResult>(body)
        .map(AnalysisResult::normalized)
        .map_err(|e| ProviderError::MalformedResponse {
            reason: format!("analysis is not valid JSON: {}", e),
        })
}
