use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ProviderError, ProviderResult};
use super::http::{ProviderEndpoint, post_json_with_retries};

/// Default model family; the kind suffix selects the passage or query variant.
pub const DEFAULT_TEXT_MODEL_PREFIX: &str = "solar-embedding-1-large";

/// Default image embedding model.
pub const DEFAULT_IMAGE_MODEL: &str = "clip-vit-base-patch32";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Asymmetric-retrieval role of a text.
pub enum EmbeddingKind {
    /// Stored text that will be searched against.
    Passage,
    /// Text used to search.
    Query,
}

impl EmbeddingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingKind::Passage => "passage",
            EmbeddingKind::Query => "query",
        }
    }
}

impl fmt::Display for EmbeddingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
/// Turns text or images into vectors.
///
/// Callers treat any error as "no vector" for that input; a failed embedding never
/// aborts ranking or duplicate detection.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `text` for the given retrieval role.
    async fn embed_text(&self, text: &str, kind: EmbeddingKind) -> ProviderResult<Vec<f32>>;

    /// Embeds raw image bytes.
    async fn embed_image(&self, image: &[u8]) -> ProviderResult<Vec<f32>>;
}

#[derive(Serialize)]
struct TextEmbeddingRequest<'a> {
    model: String,
    input: &'a str,
}

#[derive(Serialize)]
struct ImageInput {
    image: String,
}

#[derive(Serialize)]
struct ImageEmbeddingRequest<'a> {
    model: &'a str,
    input: [ImageInput; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_first(self) -> ProviderResult<Vec<f32>> {
        let vector = self
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::MalformedResponse {
                reason: "embedding response contained no data".to_string(),
            })?;

        if vector.is_empty() {
            return Err(ProviderError::MalformedResponse {
                reason: "embedding response contained an empty vector".to_string(),
            });
        }

        Ok(vector)
    }
}

#[derive(Debug, Clone)]
/// Embedding client for an OpenAI-compatible `/embeddings` endpoint.
///
/// Text models are addressed as `{prefix}-passage` / `{prefix}-query`. Images are sent
/// base64-encoded as `{"input": [{"image": ...}]}`, the multimodal input shape accepted
/// by CLIP-style embedding services.
pub struct HttpEmbeddingProvider {
    http: HttpClient,
    endpoint: ProviderEndpoint,
    text_model_prefix: String,
    image_model: String,
}

impl HttpEmbeddingProvider {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self {
            http: endpoint.build_client(),
            endpoint,
            text_model_prefix: DEFAULT_TEXT_MODEL_PREFIX.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    pub fn with_text_model_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.text_model_prefix = prefix.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Full text model name for `kind`.
    pub fn text_model(&self, kind: EmbeddingKind) -> String {
        format!("{}-{}", self.text_model_prefix, kind.as_str())
    }

    pub fn endpoint(&self) -> &ProviderEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_text(&self, text: &str, kind: EmbeddingKind) -> ProviderResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput {
                reason: "cannot embed empty text".to_string(),
            });
        }

        let request = TextEmbeddingRequest {
            model: self.text_model(kind),
            input: text,
        };

        debug!(model = %request.model, chars = text.len(), "Embedding text");

        let response: EmbeddingResponse =
            post_json_with_retries(&self.http, &self.endpoint, "embeddings", &request).await?;
        response.into_first()
    }

    async fn embed_image(&self, image: &[u8]) -> ProviderResult<Vec<f32>> {
        if image.is_empty() {
            return Err(ProviderError::InvalidInput {
                reason: "cannot embed an empty image".to_string(),
            });
        }

        let request = ImageEmbeddingRequest {
            model: &self.image_model,
            input: [ImageInput {
                image: BASE64.encode(image),
            }],
        };

        debug!(model = %self.image_model, bytes = image.len(), "Embedding image");

        let response: EmbeddingResponse =
            post_json_with_retries(&self.http, &self.endpoint, "embeddings", &request).await?;
        response.into_first()
    }
}
