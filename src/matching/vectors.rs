use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::Profile;
use crate::providers::{EmbeddingKind, EmbeddingProvider};
use crate::store::{StoreResult, VectorKind, VectorStore, run_blocking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// What happened to one of a profile's vectors.
pub enum VectorSaveStatus {
    Saved,
    Skipped,
}

impl VectorSaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, VectorSaveStatus::Saved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome of [`generate_profile_vectors`], one status per vector kind.
pub struct ProfileVectorReport {
    pub self_vector: VectorSaveStatus,
    pub criteria_vector: VectorSaveStatus,
}

/// Embeds a user's two descriptions and saves the non-empty results.
///
/// The self-description is embedded as a passage (it is searched against) and the
/// roommate criteria as a query. Absent or blank text, and embeddings that fail or come
/// back empty, are skipped. Only a store write failure is an error.
pub async fn generate_profile_vectors(
    embedder: &dyn EmbeddingProvider,
    store: Arc<dyn VectorStore>,
    user_id: i64,
    self_description: Option<&str>,
    roommate_description: Option<&str>,
) -> StoreResult<ProfileVectorReport> {
    let self_vector = embed_and_save(
        embedder,
        &store,
        user_id,
        VectorKind::SelfDescription,
        EmbeddingKind::Passage,
        self_description,
    )
    .await?;

    let criteria_vector = embed_and_save(
        embedder,
        &store,
        user_id,
        VectorKind::Criteria,
        EmbeddingKind::Query,
        roommate_description,
    )
    .await?;

    Ok(ProfileVectorReport {
        self_vector,
        criteria_vector,
    })
}

async fn embed_and_save(
    embedder: &dyn EmbeddingProvider,
    store: &Arc<dyn VectorStore>,
    user_id: i64,
    kind: VectorKind,
    role: EmbeddingKind,
    text: Option<&str>,
) -> StoreResult<VectorSaveStatus> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(VectorSaveStatus::Skipped);
    };

    let vector = match embedder.embed_text(text, role).await {
        Ok(vector) => vector,
        Err(e) => {
            warn!(user_id, kind = %kind, error = %e, "Embedding failed; vector not saved");
            return Ok(VectorSaveStatus::Skipped);
        }
    };

    if vector.is_empty() {
        return Ok(VectorSaveStatus::Skipped);
    }

    let dim = vector.len();
    let store = store.clone();
    run_blocking(move || store.save(user_id, kind, &vector)).await?;
    debug!(user_id, kind = %kind, dim, "Saved profile vector");
    Ok(VectorSaveStatus::Saved)
}

/// Fills missing embeddings of `profile` from `store`. Inline vectors are kept.
///
/// A failing store is logged and treated as "no stored vector".
pub fn resolve_profile_vectors(profile: &mut Profile, store: &dyn VectorStore) {
    if profile.self_vector().is_none() {
        profile.self_embedding = load_or_none(store, profile.id, VectorKind::SelfDescription);
    }
    if profile.criteria_vector().is_none() {
        profile.criteria_embedding = load_or_none(store, profile.id, VectorKind::Criteria);
    }
}

/// Resolves the seeker's and every candidate's vectors on the blocking pool.
pub async fn resolve_match_vectors(
    store: Arc<dyn VectorStore>,
    mut seeker: Profile,
    mut candidates: Vec<Profile>,
) -> StoreResult<(Profile, Vec<Profile>)> {
    run_blocking(move || {
        resolve_profile_vectors(&mut seeker, store.as_ref());
        for candidate in &mut candidates {
            resolve_profile_vectors(candidate, store.as_ref());
        }
        Ok((seeker, candidates))
    })
    .await
}

fn load_or_none(store: &dyn VectorStore, id: i64, kind: VectorKind) -> Option<Vec<f32>> {
    match store.load(id, kind) {
        Ok(vector) => vector,
        Err(e) => {
            warn!(user_id = id, kind = %kind, error = %e, "Failed to load stored vector");
            None
        }
    }
}
