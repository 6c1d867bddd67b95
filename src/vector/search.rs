use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::warn;

use super::math::clamped_similarity;

#[derive(Debug, Clone, PartialEq)]
/// One candidate's similarity to the query.
pub struct SimilarityHit<K> {
    /// Candidate identifier.
    pub id: K,
    /// Clamped cosine similarity in `[0, 1]`.
    pub similarity: f32,
}

/// Scores every candidate that has a vector against `query` and sorts descending.
///
/// Candidates without a vector, or whose vector has a different dimension than the
/// query, are absent from the output. Equal similarities keep input order.
pub fn rank_by_similarity<'a, K, I>(query: &[f32], candidates: I) -> Vec<SimilarityHit<K>>
where
    K: Copy + std::fmt::Debug,
    I: IntoIterator<Item = (K, Option<&'a [f32]>)>,
{
    let mut hits: Vec<SimilarityHit<K>> = candidates
        .into_iter()
        .filter_map(|(id, vector)| {
            let vector = vector?;
            match clamped_similarity(query, vector) {
                Ok(similarity) => Some(SimilarityHit { id, similarity }),
                Err(e) => {
                    warn!(candidate_id = ?id, error = %e, "Skipping candidate vector");
                    None
                }
            }
        })
        .collect();

    // sort_by is stable, so ties keep candidate order.
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });

    hits
}

/// Same as [`rank_by_similarity`] but keyed for lookup. Missing keys mean similarity 0.
pub fn similarity_map<'a, K, I>(query: &[f32], candidates: I) -> HashMap<K, f32>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
    I: IntoIterator<Item = (K, Option<&'a [f32]>)>,
{
    rank_by_similarity(query, candidates)
        .into_iter()
        .map(|hit| (hit.id, hit.similarity))
        .collect()
}
