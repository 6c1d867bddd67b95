use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::embedding::{EmbeddingKind, EmbeddingProvider};
use super::error::{ProviderError, ProviderResult};
use super::offline::{OFFLINE_EMBEDDING_DIM, hashed_embedding};
use super::vision::VisionAnalyzer;
use crate::repair::types::AnalysisResult;

#[derive(Default, Clone)]
/// Embedding double with canned vectors, call counting, and failure injection.
///
/// Inputs without a canned vector fall back to a hashed embedding.
pub struct MockEmbeddingProvider {
    texts: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    images: Arc<RwLock<HashMap<Vec<u8>, Vec<f32>>>>,
    text_calls: Arc<AtomicUsize>,
    image_calls: Arc<AtomicUsize>,
    fail: bool,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with [`ProviderError::RequestFailed`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_text(self, text: &str, vector: Vec<f32>) -> Self {
        self.texts.write().insert(text.to_string(), vector);
        self
    }

    pub fn with_image(self, image: &[u8], vector: Vec<f32>) -> Self {
        self.images.write().insert(image.to_vec(), vector);
        self
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    fn failure() -> ProviderError {
        ProviderError::RequestFailed {
            endpoint: "mock://embeddings".to_string(),
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_text(&self, text: &str, _kind: EmbeddingKind) -> ProviderResult<Vec<f32>> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::failure());
        }
        Ok(self
            .texts
            .read()
            .get(text)
            .cloned()
            .unwrap_or_else(|| hashed_embedding(text.as_bytes(), OFFLINE_EMBEDDING_DIM)))
    }

    async fn embed_image(&self, image: &[u8]) -> ProviderResult<Vec<f32>> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Self::failure());
        }
        Ok(self
            .images
            .read()
            .get(image)
            .cloned()
            .unwrap_or_else(|| hashed_embedding(image, OFFLINE_EMBEDDING_DIM)))
    }
}

#[derive(Clone)]
/// Vision double returning a fixed result (or a malformed-response error).
pub struct MockVisionAnalyzer {
    result: Option<AnalysisResult>,
    calls: Arc<AtomicUsize>,
}

impl MockVisionAnalyzer {
    pub fn returning(result: AnalysisResult) -> Self {
        Self {
            result: Some(result),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every call fails with [`ProviderError::MalformedResponse`].
    pub fn malformed() -> Self {
        Self {
            result: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionAnalyzer for MockVisionAnalyzer {
    async fn analyze(&self, _image: &[u8]) -> ProviderResult<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .ok_or_else(|| ProviderError::MalformedResponse {
                reason: "mock analyzer returned unparseable output".to_string(),
            })
    }
}
