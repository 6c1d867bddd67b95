use async_trait::async_trait;

use super::embedding::{EmbeddingKind, EmbeddingProvider};
use super::error::{ProviderError, ProviderResult};
use super::vision::VisionAnalyzer;
use crate::repair::types::{AnalysisResult, Severity};

/// Dimension of vectors produced by [`OfflineEmbeddingProvider`].
pub const OFFLINE_EMBEDDING_DIM: usize = 64;

/// Derives a pseudo-embedding from a blake3 hash of the input.
///
/// Identical inputs map to identical vectors (similarity 1.0); distinct inputs map to
/// unrelated vectors. The retrieval role is ignored so a text matches itself across
/// passage and query.
pub fn hashed_embedding(input: &[u8], dim: usize) -> Vec<f32> {
    let mut reader = blake3::Hasher::new().update(input).finalize_xof();
    let mut bytes = vec![0u8; dim * 4];
    reader.fill(&mut bytes);

    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let bits = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            (bits as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
/// Network-free embedding provider.
pub struct OfflineEmbeddingProvider;

impl OfflineEmbeddingProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingProvider for OfflineEmbeddingProvider {
    async fn embed_text(&self, text: &str, _kind: EmbeddingKind) -> ProviderResult<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::InvalidInput {
                reason: "cannot embed empty text".to_string(),
            });
        }
        Ok(hashed_embedding(text.as_bytes(), OFFLINE_EMBEDDING_DIM))
    }

    async fn embed_image(&self, image: &[u8]) -> ProviderResult<Vec<f32>> {
        if image.is_empty() {
            return Err(ProviderError::InvalidInput {
                reason: "cannot embed an empty image".to_string(),
            });
        }
        Ok(hashed_embedding(image, OFFLINE_EMBEDDING_DIM))
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Network-free analyzer returning a fixed placeholder assessment.
pub struct OfflineVisionAnalyzer;

impl OfflineVisionAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VisionAnalyzer for OfflineVisionAnalyzer {
    async fn analyze(&self, _image: &[u8]) -> ProviderResult<AnalysisResult> {
        Ok(AnalysisResult {
            item: "unclassified".to_string(),
            issue: "pending review".to_string(),
            severity: Severity::Low,
            priority_score: 3,
            reasoning: "Offline analyzer: no vision model configured.".to_string(),
            description: "Report accepted without automatic analysis.".to_string(),
        })
    }
}
