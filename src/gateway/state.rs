use std::sync::Arc;

use crate::matching::CandidateRanker;
use crate::providers::EmbeddingProvider;
use crate::repair::ReportIntakeWorkflow;
use crate::store::VectorStore;

#[derive(Clone)]
pub struct HandlerState {
    pub ranker: Arc<CandidateRanker>,

    pub embedder: Arc<dyn EmbeddingProvider>,

    pub vectors: Arc<dyn VectorStore>,

    pub intake: Arc<ReportIntakeWorkflow>,
}

impl HandlerState {
    pub fn new(
        ranker: CandidateRanker,
        embedder: Arc<dyn EmbeddingProvider>,
        vectors: Arc<dyn VectorStore>,
        intake: ReportIntakeWorkflow,
    ) -> Self {
        Self {
            ranker: Arc::new(ranker),
            embedder,
            vectors,
            intake: Arc::new(intake),
        }
    }
}
